use crate::error::CliError;
use anyhow::{Context, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, instrument};

pub struct PdfDocument {
    pub doc: Document,
    pub path: String,
}

impl PdfDocument {
    /// Load a PDF, whether or not it can be read without a password.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let doc = Document::load(&path).map_err(|e| {
            CliError::bad_parameter(format!("File cannot be read: {path_str} ({e})"))
        })?;
        debug!(pages = doc.get_pages().len(), "PDF loaded");
        Ok(PdfDocument {
            doc,
            path: path_str,
        })
    }

    /// Load a PDF whose pages are readable. Files that still need a password are rejected.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let pdf = Self::load(path)?;
        if pdf.is_locked() {
            anyhow::bail!(CliError::bad_parameter(
                "File is encrypted. Decrypt it first."
            ));
        }
        Ok(pdf)
    }

    /// Load an encrypted PDF, decrypting it with `password`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open_with_password<P: AsRef<Path>>(path: P, password: &str) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let doc = Document::load_with_password(&path, password).map_err(|e| match e {
            lopdf::Error::InvalidPassword => CliError::bad_parameter("Wrong password."),
            e => CliError::bad_parameter(format!("File cannot be read: {path_str} ({e})")),
        })?;
        Ok(PdfDocument {
            doc,
            path: path_str,
        })
    }

    /// Still encrypted: the password was not known at load time.
    pub fn is_locked(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Encrypted on disk, whether or not lopdf could decrypt it on load.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted() || self.doc.was_encrypted()
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Page object IDs in page order.
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.doc.page_iter().collect()
    }

    /// Copy the given zero-based pages, in the given order, into a new document.
    pub fn select(&self, pages: &[usize]) -> Result<Document> {
        let order: Vec<_> = pages.iter().map(|&page| (0, page)).collect();
        super::assemble::assemble(&[&self.doc], &order)
    }

    /// Get metadata from the document info dictionary
    pub fn get_info(&self) -> PdfInfo {
        let mut info = PdfInfo {
            version: self.doc.version.clone(),
            page_count: self.page_count(),
            encrypted: self.is_encrypted(),
            ..Default::default()
        };

        let dict = self
            .doc
            .trailer
            .get_deref(b"Info", &self.doc)
            .and_then(Object::as_dict);

        if let Ok(dict) = dict {
            for (key, value) in dict.iter() {
                let Some(text) = object_text(value) else {
                    continue;
                };
                let key = String::from_utf8_lossy(key).into_owned();
                match key.as_str() {
                    "Title" => info.title = Some(text),
                    "Author" => info.author = Some(text),
                    "Subject" => info.subject = Some(text),
                    "Keywords" => info.keywords = Some(text),
                    "Creator" => info.creator = Some(text),
                    "Producer" => info.producer = Some(text),
                    "CreationDate" => info.creation_date = Some(text),
                    "ModDate" => info.mod_date = Some(text),
                    _ => info.other.push((key, text)),
                }
            }
        }

        info
    }

    /// Save to a file, creating parent directories. Existing files are overwritten.
    pub fn save<P: AsRef<Path>>(doc: &mut Document, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        doc.save(path)
            .with_context(|| format!("Failed to save PDF: {}", path.display()))?;
        debug!(path = %path.display(), "PDF saved");
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct PdfInfo {
    pub version: String,
    pub page_count: usize,
    pub encrypted: bool,
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub mod_date: Option<String>,
    /// Custom info entries, in dictionary order.
    pub other: Vec<(String, String)>,
}

fn object_text(obj: &Object) -> Option<String> {
    match obj {
        Object::String(..) => lopdf::decode_text_string(obj).ok(),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        Object::Integer(n) => Some(n.to_string()),
        Object::Real(n) => Some(n.to_string()),
        Object::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Look up a page attribute, walking up the page tree for inheritable keys.
pub(crate) fn page_attribute(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    if let Ok(value) = page.get(key) {
        return Some(value.clone());
    }

    let mut node = page;
    let mut seen = HashSet::new();
    loop {
        let parent_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        if !seen.insert(parent_id) {
            return None;
        }
        node = doc.get_dictionary(parent_id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
    }
}

/// Read a rectangle (`MediaBox`, `CropBox`, `Rect`, ...) as four numbers.
pub(crate) fn rect(doc: &Document, obj: &Object) -> Option<[f32; 4]> {
    let (_, obj) = doc.dereference(obj).ok()?;
    let values = obj.as_array().ok()?;
    if values.len() != 4 {
        return None;
    }
    let mut out = [0.0; 4];
    for (slot, value) in out.iter_mut().zip(values) {
        *slot = doc.dereference(value).ok()?.1.as_float().ok()?;
    }
    Some(out)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    /// Build a document whose pages each draw the text `pageN`. Page size and
    /// resources are inherited from the page tree root.
    pub fn sample_document(pages: usize) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut kids = Vec::new();
        for n in 1..=pages {
            let content = format!("BT /F1 24 Tf 72 720 Td (page{n}) Tj ET");
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => pages as i64,
                "Kids" => kids,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal("Sample"),
            "Author" => Object::string_literal("Tester"),
            "Trapped" => "False",
        });
        doc.trailer.set("Info", info_id);

        doc
    }

    /// The `pageN` label drawn on each page, in page order.
    pub fn page_labels(doc: &Document) -> Vec<String> {
        doc.page_iter()
            .map(|id| {
                let content = doc.get_page_content(id).unwrap();
                let text = String::from_utf8_lossy(&content);
                let start = text.find("(page").unwrap() + 1;
                let end = start + text[start..].find(')').unwrap();
                text[start..end].to_string()
            })
            .collect()
    }

    fn wrap(doc: Document) -> PdfDocument {
        PdfDocument {
            doc,
            path: "sample.pdf".to_string(),
        }
    }

    #[test]
    fn test_info() {
        let pdf = wrap(sample_document(3));
        let info = pdf.get_info();
        assert_eq!(info.page_count, 3);
        assert_eq!(info.version, "1.5");
        assert!(!info.encrypted);
        assert_eq!(info.title.as_deref(), Some("Sample"));
        assert_eq!(info.author.as_deref(), Some("Tester"));
        assert_eq!(info.other, vec![("Trapped".to_string(), "False".to_string())]);
    }

    #[test]
    fn test_select_keeps_order() {
        let pdf = wrap(sample_document(5));
        let doc = pdf.select(&[4, 0, 2]).unwrap();
        assert_eq!(page_labels(&doc), vec!["page5", "page1", "page3"]);
    }

    #[test]
    fn test_inherited_attribute() {
        let doc = sample_document(2);
        let page_id = doc.page_iter().next().unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        let media_box = page_attribute(&doc, page, b"MediaBox").unwrap();
        assert_eq!(rect(&doc, &media_box), Some([0.0, 0.0, 612.0, 792.0]));
        assert!(page_attribute(&doc, page, b"Rotate").is_none());
    }

    #[test]
    fn test_save_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.pdf");
        let mut doc = sample_document(1);
        PdfDocument::save(&mut doc, &path).unwrap();

        let pdf = PdfDocument::open(&path).unwrap();
        assert_eq!(pdf.page_count(), 1);
        assert!(!pdf.is_locked());
    }

    #[test]
    fn test_open_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();
        let err = PdfDocument::open(&path).err().unwrap();
        assert!(err.downcast_ref::<CliError>().is_some());
        assert!(err.to_string().starts_with("File cannot be read"));
    }
}
