#![allow(dead_code)]

use assert_cmd::Command;
use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};

pub fn cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pdfops").unwrap();
    cmd.current_dir(dir);
    cmd
}

/// Build a PDF whose pages each show `pageN`, with `first` as the first label.
pub fn numbered_pdf(pages: usize, first: usize) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for n in first..first + pages {
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
        "Title" => Object::string_literal("Fixture"),
        "Author" => Object::string_literal("Tests"),
    });
    doc.trailer.set("Info", info_id);
    doc
}

/// Write a `pages`-page fixture into `dir` and return its path.
pub fn write_pdf(dir: &Path, name: &str, pages: usize) -> PathBuf {
    write_pdf_from(dir, name, pages, 1)
}

pub fn write_pdf_from(dir: &Path, name: &str, pages: usize, first: usize) -> PathBuf {
    let path = dir.join(name);
    numbered_pdf(pages, first).save(&path).unwrap();
    path
}

/// The `pageN` labels of a written PDF, in page order.
pub fn labels(path: &Path) -> Vec<String> {
    let doc = Document::load(path).unwrap();
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

pub fn expected(pages: &[usize]) -> Vec<String> {
    pages.iter().map(|n| format!("page{n}")).collect()
}
