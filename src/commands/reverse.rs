use super::Written;
use crate::output::output_name;
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;

pub fn execute(input: &Path, output: Option<&Path>) -> Result<Written> {
    let output = output_name(input, output, "reversed")?;
    let pdf = PdfDocument::open(input)?;

    let pages: Vec<usize> = (0..pdf.page_count()).rev().collect();
    let mut doc = pdf.select(&pages)?;
    PdfDocument::save(&mut doc, &output)?;

    Ok(Written {
        output,
        page_count: pages.len(),
    })
}

pub fn run(input: &Path, output: Option<&Path>) -> Result<()> {
    let written = execute(input, output)?;
    println!(
        "Reversed {} page(s) into {}",
        written.page_count,
        written.output.display()
    );
    Ok(())
}
