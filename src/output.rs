use crate::error::CliError;
use anyhow::Result;
use std::path::{Path, PathBuf};

const PDF_EXT: &str = ".pdf";

fn is_pdf(path: &Path) -> bool {
    path.to_str().is_some_and(|s| s.ends_with(PDF_EXT))
}

/// Resolve where a command writes its result.
///
/// An explicit `output` is used as-is after checking it. Otherwise the output is
/// `<input stem>_<suffix>.pdf` in the current directory.
pub fn output_name(input: &Path, output: Option<&Path>, suffix: &str) -> Result<PathBuf> {
    if !is_pdf(input) {
        return Err(CliError::bad_parameter("Only .pdf files allowed.").into());
    }

    if let Some(output) = output {
        if !is_pdf(output) {
            return Err(CliError::bad_parameter("Only .pdf files allowed.").into());
        }
        if same_file(input, output) {
            return Err(CliError::bad_parameter("Cannot output to input file.").into());
        }
        return Ok(output.to_path_buf());
    }

    let name = input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let stem = name.strip_suffix(PDF_EXT).unwrap_or(name);
    Ok(PathBuf::from(format!("{stem}_{suffix}{PDF_EXT}")))
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Left-pad `k` with zeroes to `width` digits.
pub fn numbered(width: usize, k: usize) -> String {
    format!("{k:0width$}")
}

/// Number of decimal digits in `n`.
pub fn digits(n: usize) -> usize {
    n.to_string().len()
}

/// Paths for the pieces of a split: `<base>_<k>.pdf`, with `k` padded to the
/// width of the largest group number.
pub fn split_names(base: &Path, groups: usize) -> Vec<PathBuf> {
    let base = base.to_string_lossy();
    let prefix = base.strip_suffix(PDF_EXT).unwrap_or(&base);
    let width = digits(groups);
    (1..=groups)
        .map(|k| PathBuf::from(format!("{prefix}_{}{PDF_EXT}", numbered(width, k))))
        .collect()
}
