//! Extract command implementation.

use crate::cli::Output;
use crate::orchestrator::extract_file;
use crate::pdf::PdfTextExtractor;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Print (or write) the text of a PDF.
pub async fn run_extract(input: &str, output: Option<String>) -> Result<()> {
    let path = PathBuf::from(input);
    let text = extract_file(Arc::new(PdfTextExtractor::new()), path).await?;

    match output {
        Some(out) => {
            std::fs::write(&out, &text).with_context(|| format!("Failed to write {}", out))?;
            Output::success(&format!("Wrote {} characters to {}", text.chars().count(), out));
        }
        None => println!("{}", text),
    }

    Ok(())
}
