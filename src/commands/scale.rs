use super::{PageSelection, Written};
use crate::output::output_name;
use crate::pdf::transform::{self, Scaling};
use crate::pdf::PdfDocument;
use crate::selection::BoundaryCheck;
use anyhow::Result;
use std::path::Path;
use tracing::info;

pub fn execute(
    input: &Path,
    output: Option<&Path>,
    selection: &PageSelection,
    scaling: Scaling,
) -> Result<Written> {
    let requested = selection.parse()?;
    let output = output_name(input, output, "scaled")?;

    let mut pdf = PdfDocument::open(input)?;
    let page_ids = pdf.page_ids();
    let selected = requested.validate(&BoundaryCheck::pages(page_ids.len())?)?;
    let targets: Vec<_> = selected.iter().map(|&page| page_ids[page]).collect();

    transform::scale(&mut pdf.doc, &targets, scaling)?;
    PdfDocument::save(&mut pdf.doc, &output)?;
    info!(path = %pdf.path, pages = targets.len(), "scaled pages");

    Ok(Written {
        output,
        page_count: targets.len(),
    })
}

pub fn run(
    input: &Path,
    output: Option<&Path>,
    selection: &PageSelection,
    horizontal: f32,
    vertical: f32,
    scale_to: bool,
) -> Result<()> {
    let scaling = Scaling::new(horizontal, vertical, scale_to)?;
    let written = execute(input, output, selection, scaling)?;
    println!(
        "Scaled {} page(s) into {}",
        written.page_count,
        written.output.display()
    );
    Ok(())
}
