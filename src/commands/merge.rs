use super::Written;
use crate::error::CliError;
use crate::output::output_name;
use crate::pdf::{assemble, PdfDocument};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Every `*.pdf` file directly inside `dir`, sorted by file name.
pub fn pdf_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to read directory: {}", dir.display()))?;
        if entry.file_type().is_file() && entry.file_name().to_string_lossy().ends_with(".pdf") {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Concatenate `inputs` in order. With `all` set or no inputs given, every PDF
/// in the current directory is merged instead.
pub fn execute(inputs: &[PathBuf], output: Option<&Path>, all: bool) -> Result<Written> {
    let scanned = all || inputs.is_empty();
    let mut inputs = if scanned {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        pdf_files_in(&cwd)?
            .into_iter()
            .map(|path| path.strip_prefix(&cwd).map(Path::to_path_buf).unwrap_or(path))
            .collect()
    } else {
        inputs.to_vec()
    };

    let Some(first) = inputs.first().cloned() else {
        anyhow::bail!(CliError::bad_parameter(
            "Cannot merge less than two files."
        ));
    };
    let output = output_name(&first, output, "merged")?;
    if scanned {
        inputs.retain(|path| path != &output);
    }
    if inputs.len() < 2 {
        anyhow::bail!(CliError::bad_parameter(
            "Cannot merge less than two files."
        ));
    }
    debug!(files = inputs.len(), "merging");

    let docs = inputs
        .iter()
        .map(PdfDocument::open)
        .collect::<Result<Vec<_>>>()?;

    let order: Vec<(usize, usize)> = docs
        .iter()
        .enumerate()
        .flat_map(|(n, pdf)| (0..pdf.page_count()).map(move |page| (n, page)))
        .collect();
    let sources: Vec<_> = docs.iter().map(|pdf| &pdf.doc).collect();

    let mut doc = assemble(&sources, &order)?;
    PdfDocument::save(&mut doc, &output)?;

    Ok(Written {
        output,
        page_count: order.len(),
    })
}

pub fn run(inputs: &[PathBuf], output: Option<&Path>, all: bool) -> Result<()> {
    let written = execute(inputs, output, all)?;
    println!(
        "Merged {} page(s) into {}",
        written.page_count,
        written.output.display()
    );
    Ok(())
}
