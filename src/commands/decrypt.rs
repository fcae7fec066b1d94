use super::Written;
use crate::output::output_name;
use crate::pdf::{security, PdfDocument};
use anyhow::Result;
use std::path::Path;

pub fn execute(input: &Path, output: Option<&Path>, password: &str) -> Result<Written> {
    let output = output_name(input, output, "decrypted")?;

    let mut pdf = security::decrypt(input, password)?;
    PdfDocument::save(&mut pdf.doc, &output)?;

    Ok(Written {
        output,
        page_count: pdf.page_count(),
    })
}

pub fn run(input: &Path, output: Option<&Path>, password: &str) -> Result<()> {
    let written = execute(input, output, password)?;
    println!("Decrypted {} into {}", input.display(), written.output.display());
    Ok(())
}
