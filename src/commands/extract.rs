use super::{PageSelection, Written};
use crate::error::CliError;
use crate::output::output_name;
use crate::pdf::PdfDocument;
use crate::selection::BoundaryCheck;
use anyhow::Result;
use std::path::Path;

/// Keep only the selected pages, in ascending order.
pub fn execute(input: &Path, output: Option<&Path>, selection: &PageSelection) -> Result<Written> {
    let requested = selection.parse()?;
    let output = output_name(input, output, "extracted")?;

    let pdf = PdfDocument::open(input)?;
    let total_pages = pdf.page_count();
    let selected = requested.validate(&BoundaryCheck::pages(total_pages)?)?;
    if selected.len() == total_pages {
        anyhow::bail!(CliError::bad_parameter("Cannot extract all pages."));
    }

    let pages: Vec<usize> = selected.into_iter().collect();
    let mut doc = pdf.select(&pages)?;
    PdfDocument::save(&mut doc, &output)?;

    Ok(Written {
        output,
        page_count: pages.len(),
    })
}

pub fn run(input: &Path, output: Option<&Path>, selection: &PageSelection) -> Result<()> {
    let written = execute(input, output, selection)?;
    println!(
        "Extracted {} page(s) to {}",
        written.page_count,
        written.output.display()
    );
    Ok(())
}
