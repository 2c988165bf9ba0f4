//! Error types for Papercast.

use thiserror::Error;

/// Library-level error type for Papercast operations.
#[derive(Error, Debug)]
pub enum PapercastError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("Text generation failed: {0}")]
    Generation(String),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl PapercastError {
    /// Whether the error was caused by the caller's input rather than a failing collaborator.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PapercastError::Validation(_) | PapercastError::NotFound(_))
    }
}

/// Result type alias for Papercast operations.
pub type Result<T> = std::result::Result<T, PapercastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_bare() {
        let err = PapercastError::Validation("No file part".to_string());
        assert_eq!(err.to_string(), "No file part");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_collaborator_errors_are_prefixed() {
        let err = PapercastError::Generation("timeout".to_string());
        assert_eq!(err.to_string(), "Text generation failed: timeout");
        assert!(!err.is_client_error());
    }
}
