use super::{PageSelection, Written};
use crate::output::output_name;
use crate::pdf::{transform, PdfDocument};
use crate::selection::BoundaryCheck;
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Rotate the selected pages clockwise by `angle` degrees.
pub fn execute(
    input: &Path,
    output: Option<&Path>,
    selection: &PageSelection,
    angle: i64,
) -> Result<Written> {
    let requested = selection.parse()?;
    let output = output_name(input, output, "rotated")?;

    let mut pdf = PdfDocument::open(input)?;
    let page_ids = pdf.page_ids();
    let selected = requested.validate(&BoundaryCheck::pages(page_ids.len())?)?;
    let targets: Vec<_> = selected.iter().map(|&page| page_ids[page]).collect();

    transform::rotate(&mut pdf.doc, &targets, angle)?;
    PdfDocument::save(&mut pdf.doc, &output)?;
    info!(path = %pdf.path, pages = targets.len(), "rotated pages");

    Ok(Written {
        output,
        page_count: targets.len(),
    })
}

pub fn run(input: &Path, output: Option<&Path>, selection: &PageSelection, angle: i64) -> Result<()> {
    let written = execute(input, output, selection, angle)?;
    println!(
        "Rotated {} page(s) by {} degrees into {}",
        written.page_count,
        angle,
        written.output.display()
    );
    Ok(())
}
