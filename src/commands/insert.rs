use super::Written;
use crate::output::output_name;
use crate::pdf::{assemble, PdfDocument};
use crate::error::CliError;
use crate::selection::{validate, BoundaryCheck, SelectionToken};
use anyhow::Result;
use std::path::Path;

/// Insert every page of `insert` into `input` so that the first inserted page
/// becomes page `index` (one-based). `index` may be one past the last page to
/// append.
pub fn execute(input: &Path, insert: &Path, output: Option<&Path>, index: &str) -> Result<Written> {
    let requested = SelectionToken::parse_index(index)?.pages();
    let output = output_name(input, output, "inserted")?;

    let base = PdfDocument::open(input)?;
    let extra = PdfDocument::open(insert)?;
    let base_pages = base.page_count();

    let check = BoundaryCheck::pages(base_pages + 1)?;
    let at = validate(requested, |p| check.contains(p), true)?
        .first()
        .copied()
        .ok_or(CliError::NoPagesSelected)?;

    let order: Vec<(usize, usize)> = (0..at)
        .map(|page| (0, page))
        .chain((0..extra.page_count()).map(|page| (1, page)))
        .chain((at..base_pages).map(|page| (0, page)))
        .collect();

    let mut doc = assemble(&[&base.doc, &extra.doc], &order)?;
    PdfDocument::save(&mut doc, &output)?;

    Ok(Written {
        output,
        page_count: order.len(),
    })
}

pub fn run(input: &Path, insert: &Path, output: Option<&Path>, index: &str) -> Result<()> {
    let written = execute(input, insert, output, index)?;
    println!(
        "Inserted {} at page {} of {}: {} page(s) in {}",
        insert.display(),
        index.trim(),
        input.display(),
        written.page_count,
        written.output.display()
    );
    Ok(())
}
