use crate::pdf::{PdfDocument, PdfInfo};
use anyhow::Result;
use std::path::Path;

pub fn execute<P: AsRef<Path>>(path: P) -> Result<PdfInfo> {
    let doc = PdfDocument::open(&path)?;
    Ok(doc.get_info())
}

pub fn run<P: AsRef<Path>>(path: P, json: bool) -> Result<()> {
    let info = execute(&path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("File: {}", path.as_ref().display());
    println!("Pages: {}", info.page_count);
    println!("Version: {}", info.version);
    println!("Encrypted: {}", if info.encrypted { "yes" } else { "no" });

    if let Some(title) = &info.title {
        println!("Title: {}", title);
    }
    if let Some(author) = &info.author {
        println!("Author: {}", author);
    }
    if let Some(subject) = &info.subject {
        println!("Subject: {}", subject);
    }
    if let Some(keywords) = &info.keywords {
        println!("Keywords: {}", keywords);
    }
    if let Some(creator) = &info.creator {
        println!("Creator: {}", creator);
    }
    if let Some(producer) = &info.producer {
        println!("Producer: {}", producer);
    }
    if let Some(creation_date) = &info.creation_date {
        println!("Created: {}", format_pdf_date(creation_date));
    }
    if let Some(mod_date) = &info.mod_date {
        println!("Modified: {}", format_pdf_date(mod_date));
    }
    for (key, value) in &info.other {
        println!("{}: {}", key, value);
    }

    Ok(())
}

fn format_pdf_date(date: &str) -> String {
    // D:YYYYMMDDHHmmSSOHH'mm
    let Some(d) = date.strip_prefix("D:") else {
        return date.to_string();
    };
    if d.len() < 8 || !d.is_char_boundary(8) || !d[..8].bytes().all(|b| b.is_ascii_digit()) {
        return date.to_string();
    }

    let time = match d.get(8..14) {
        Some(t) if t.bytes().all(|b| b.is_ascii_digit()) => {
            format!(" {}:{}:{}", &t[0..2], &t[2..4], &t[4..6])
        }
        _ => String::new(),
    };
    format!("{}-{}-{}{}", &d[0..4], &d[4..6], &d[6..8], time)
}
