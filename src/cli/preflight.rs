//! Pre-flight checks before starting work.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail on the first request.

use crate::config::Settings;
use crate::error::Result;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Serving requires the language model key.
    Serve,
    /// Summarizing requires the language model key.
    Summarize,
    /// Extraction is local only.
    Extract,
}

/// Run pre-flight checks for the given operation.
///
/// Returns the language model API key when the operation needs one.
pub fn check(operation: Operation, settings: &Settings) -> Result<Option<String>> {
    match operation {
        Operation::Serve | Operation::Summarize => settings.api_key().map(Some),
        Operation::Extract => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_has_no_requirements() {
        assert_eq!(check(Operation::Extract, &Settings::default()).unwrap(), None);
    }

    #[test]
    fn test_serve_refuses_without_key() {
        let mut settings = Settings::default();
        settings.llm.api_key_env = "PAPERCAST_PREFLIGHT_UNSET_KEY".to_string();
        assert!(check(Operation::Serve, &settings).is_err());
    }
}
