use super::{PageSelection, Written};
use crate::error::CliError;
use crate::output::output_name;
use crate::pdf::PdfDocument;
use crate::selection::BoundaryCheck;
use anyhow::Result;
use std::path::Path;
use tracing::info;

pub fn execute(input: &Path, output: Option<&Path>, selection: &PageSelection) -> Result<Written> {
    let requested = selection.parse()?;
    let output = output_name(input, output, "deleted")?;

    let pdf = PdfDocument::open(input)?;
    let total_pages = pdf.page_count();
    let selected = requested.validate(&BoundaryCheck::pages(total_pages)?)?;
    if selected.len() == total_pages {
        anyhow::bail!(CliError::bad_parameter("Cannot delete all pages."));
    }

    let keep: Vec<usize> = (0..total_pages)
        .filter(|page| !selected.contains(page))
        .collect();
    let mut doc = pdf.select(&keep)?;
    PdfDocument::save(&mut doc, &output)?;
    info!(path = %pdf.path, deleted = selected.len(), kept = keep.len(), "deleted pages");

    Ok(Written {
        output,
        page_count: keep.len(),
    })
}

pub fn run(input: &Path, output: Option<&Path>, selection: &PageSelection) -> Result<()> {
    let written = execute(input, output, selection)?;
    println!(
        "Deleted page(s) from {}, {} page(s) left in {}",
        input.display(),
        written.page_count,
        written.output.display()
    );
    Ok(())
}
