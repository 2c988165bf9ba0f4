//! PDF text extraction.
//!
//! `pdf_extract` can panic on malformed input instead of returning an error,
//! so every call is wrapped in `catch_unwind` and surfaced as
//! [`PapercastError::Extraction`].

use crate::error::{PapercastError, Result};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::{debug, instrument};

/// Trait for turning a saved document into plain text.
pub trait TextExtractor: Send + Sync {
    /// Extract the full text of the document at `path`.
    fn extract(&self, path: &Path) -> Result<String>;
}

/// Extractor backed by the `pdf-extract` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfTextExtractor {
    #[instrument(skip(self), fields(path = %path.display()))]
    fn extract(&self, path: &Path) -> Result<String> {
        let data = std::fs::read(path).map_err(|e| {
            PapercastError::Extraction(format!("Cannot open {}: {}", path.display(), e))
        })?;

        let pages = extract_pages(&data)?;
        debug!("Extracted {} pages", pages.len());

        Ok(join_pages(pages))
    }
}

/// Extract one string per page, converting parser panics into errors.
fn extract_pages(data: &[u8]) -> Result<Vec<String>> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(data)
    }));
    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(PapercastError::Extraction(e.to_string())),
        Err(_) => Err(PapercastError::Extraction(
            "PDF parser panicked (malformed document)".to_string(),
        )),
    }
}

/// Concatenate page texts in page order, adding no separators.
fn join_pages(pages: Vec<String>) -> String {
    pages.concat()
}
