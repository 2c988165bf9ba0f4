//! Text-to-speech synthesis.
//!
//! Synthesizers write MP3 audio to a fresh file in the audio directory and
//! return its path. Files outlive the request; the retention janitor purges them.

mod google;

pub use google::{split_text, GoogleSpeech, MAX_FRAGMENT_CHARS};

use crate::error::{PapercastError, Result};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Prefix of every audio file written by a synthesizer.
pub const AUDIO_FILE_PREFIX: &str = "speech-";

/// Language codes accepted by the speech backend.
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "af", "ar", "bg", "bn", "bs", "ca", "cs", "cy", "da", "de", "el", "en", "eo", "es", "et",
    "fi", "fr", "gu", "hi", "hr", "hu", "hy", "id", "is", "it", "iw", "ja", "jw", "km", "kn",
    "ko", "la", "lv", "mk", "ml", "mr", "my", "ne", "nl", "no", "pl", "pt", "ro", "ru", "si",
    "sk", "sq", "sr", "su", "sv", "sw", "ta", "te", "th", "tl", "tr", "uk", "ur", "vi", "zh",
    "zh-cn", "zh-tw",
];

/// Trait for speech synthesis backends.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` spoken in `language` and return the path of the MP3 file.
    async fn synthesize(&self, text: &str, language: &str) -> Result<PathBuf>;
}

/// Check a language code against [`SUPPORTED_LANGUAGES`], case-insensitively.
pub fn validate_language(language: &str) -> Result<()> {
    let code = language.trim().to_lowercase();
    if SUPPORTED_LANGUAGES.contains(&code.as_str()) {
        Ok(())
    } else {
        Err(PapercastError::Synthesis(format!(
            "Language not supported: {}",
            language
        )))
    }
}

/// Write MP3 bytes to a new, persisted file in `dir`.
pub fn write_audio_file(dir: &Path, audio: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let mut file = tempfile::Builder::new()
        .prefix(AUDIO_FILE_PREFIX)
        .suffix(".mp3")
        .tempfile_in(dir)?;
    file.write_all(audio)?;
    file.flush()?;

    let (_, path) = file
        .keep()
        .map_err(|e| PapercastError::Synthesis(format!("Cannot keep audio file: {}", e)))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_language() {
        assert!(validate_language("en").is_ok());
        assert!(validate_language("FR").is_ok());
        assert!(validate_language("zh-CN").is_ok());
        assert!(matches!(
            validate_language("klingon"),
            Err(PapercastError::Synthesis(_))
        ));
    }

    #[test]
    fn test_write_audio_file_persists() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_audio_file(dir.path(), b"ID3first").unwrap();
        let second = write_audio_file(dir.path(), b"ID3second").unwrap();

        assert_ne!(first, second);
        assert_eq!(std::fs::read(&first).unwrap(), b"ID3first");
        let name = first.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(AUDIO_FILE_PREFIX));
        assert!(name.ends_with(".mp3"));
    }
}
