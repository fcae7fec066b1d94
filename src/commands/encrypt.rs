use super::Written;
use crate::error::CliError;
use crate::output::output_name;
use crate::pdf::{security, PdfDocument};
use anyhow::{Context, Result};
use std::path::Path;

pub fn execute(
    input: &Path,
    output: Option<&Path>,
    user_password: &str,
    owner_password: Option<&str>,
    use_40bit: bool,
) -> Result<Written> {
    let output = output_name(input, output, "encrypted")?;

    let mut pdf = PdfDocument::load(input)?;
    if pdf.is_encrypted() {
        anyhow::bail!(CliError::bad_usage("File is already encrypted."));
    }
    let seed = std::fs::read(input)
        .with_context(|| format!("Failed to read file: {}", input.display()))?;

    security::encrypt(&mut pdf.doc, user_password, owner_password, use_40bit, &seed)?;
    PdfDocument::save(&mut pdf.doc, &output)?;

    Ok(Written {
        output,
        page_count: pdf.page_count(),
    })
}

pub fn run(
    input: &Path,
    output: Option<&Path>,
    user_password: &str,
    owner_password: Option<&str>,
    use_40bit: bool,
) -> Result<()> {
    let written = execute(input, output, user_password, owner_password, use_40bit)?;
    println!(
        "Encrypted {} ({}-bit) into {}",
        input.display(),
        if use_40bit { 40 } else { 128 },
        written.output.display()
    );
    Ok(())
}
