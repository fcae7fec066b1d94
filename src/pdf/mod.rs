pub mod assemble;
pub mod content;
pub mod document;
pub mod security;
pub mod transform;

pub use assemble::assemble;
pub use document::{PdfDocument, PdfInfo};
