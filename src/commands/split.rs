use super::{PageSelection, Written};
use crate::error::CliError;
use crate::output::{output_name, split_names};
use crate::pdf::PdfDocument;
use crate::selection::{split_groups, BoundaryCheck};
use anyhow::Result;
use std::path::Path;
use tracing::debug;

/// Cut the document after each selected page. Pieces are written to
/// `<output stem>_<k>.pdf`, numbered from 1.
pub fn execute(
    input: &Path,
    output: Option<&Path>,
    selection: &PageSelection,
) -> Result<Vec<Written>> {
    let requested = selection.parse()?;
    let base = output_name(input, output, "split")?;

    let pdf = PdfDocument::open(input)?;
    let total_pages = pdf.page_count();
    if total_pages < 2 {
        anyhow::bail!(CliError::bad_parameter(
            "Cannot split a file with less than two pages."
        ));
    }

    let cuts = requested.validate(&BoundaryCheck::new(total_pages, 0, 1)?)?;
    let groups = split_groups(total_pages, &cuts);
    let names = split_names(&base, groups.len());

    let mut written = Vec::with_capacity(groups.len());
    for (group, output) in groups.into_iter().zip(names) {
        debug!(?group, output = %output.display(), "writing piece");
        let pages: Vec<usize> = group.collect();
        let mut doc = pdf.select(&pages)?;
        PdfDocument::save(&mut doc, &output)?;
        written.push(Written {
            output,
            page_count: pages.len(),
        });
    }

    Ok(written)
}

pub fn run(input: &Path, output: Option<&Path>, selection: &PageSelection) -> Result<()> {
    let written = execute(input, output, selection)?;
    for piece in &written {
        println!("{} ({} page(s))", piece.output.display(), piece.page_count);
    }
    println!("Split {} into {} file(s)", input.display(), written.len());
    Ok(())
}
