use super::Written;
use crate::error::CliError;
use crate::output::output_name;
use crate::pdf::{content, PdfDocument};
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

/// Which kinds of objects to strip from every page.
#[derive(Debug, Clone, Copy, Default)]
pub struct Targets {
    pub images: bool,
    pub links: bool,
    pub text: bool,
}

#[derive(Debug, Serialize)]
pub struct Removed {
    #[serde(flatten)]
    pub written: Written,
    pub images: usize,
    pub links: usize,
    pub text: usize,
}

pub fn execute(input: &Path, output: Option<&Path>, targets: Targets) -> Result<Removed> {
    let output = output_name(input, output, "removed")?;
    if !(targets.images || targets.links || targets.text) {
        anyhow::bail!(CliError::bad_parameter(
            "No objects to remove specified."
        ));
    }

    let mut pdf = PdfDocument::open(input)?;
    let pages = pdf.page_ids();

    let images = if targets.images {
        content::remove_images(&mut pdf.doc, &pages)?
    } else {
        0
    };
    let links = if targets.links {
        content::remove_links(&mut pdf.doc, &pages)?
    } else {
        0
    };
    let text = if targets.text {
        content::remove_text(&mut pdf.doc, &pages)?
    } else {
        0
    };

    pdf.doc.prune_objects();
    PdfDocument::save(&mut pdf.doc, &output)?;

    Ok(Removed {
        written: Written {
            output,
            page_count: pages.len(),
        },
        images,
        links,
        text,
    })
}

pub fn run(input: &Path, output: Option<&Path>, targets: Targets) -> Result<()> {
    let removed = execute(input, output, targets)?;
    println!(
        "Removed {} image(s), {} link(s) and {} text operation(s) into {}",
        removed.images,
        removed.links,
        removed.text,
        removed.written.output.display()
    );
    Ok(())
}
