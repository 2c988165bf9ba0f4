//! Google Translate text-to-speech backend.
//!
//! The endpoint only accepts short fragments, so text is split into pieces of
//! at most [`MAX_FRAGMENT_CHARS`] characters, each piece is fetched as MP3, and
//! the bodies are concatenated in order into one file.

use super::{validate_language, write_audio_file, SpeechSynthesizer};
use crate::config::SpeechSettings;
use crate::error::{PapercastError, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

/// Longest fragment the endpoint accepts.
pub const MAX_FRAGMENT_CHARS: usize = 100;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) papercast";

/// Speech synthesizer backed by the Google Translate TTS endpoint.
pub struct GoogleSpeech {
    client: reqwest::Client,
    endpoint: String,
    audio_dir: PathBuf,
    max_concurrent: usize,
}

impl GoogleSpeech {
    /// Create a synthesizer writing into `audio_dir`.
    pub fn new(settings: &SpeechSettings, audio_dir: PathBuf) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PapercastError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            audio_dir,
            max_concurrent: settings.max_concurrent.max(1),
        })
    }

    /// Build the request URL for one fragment.
    fn fragment_url(&self, fragment: &str, language: &str, idx: usize, total: usize) -> Result<Url> {
        let textlen = fragment.chars().count().to_string();
        let idx = idx.to_string();
        let total = total.to_string();
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("ie", "UTF-8"),
                ("q", fragment),
                ("tl", language),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
                ("client", "tw-ob"),
            ],
        )
        .map_err(|e| PapercastError::Config(format!("Invalid speech endpoint: {}", e)))
    }

    async fn fetch_fragment(
        &self,
        fragment: &str,
        language: &str,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>> {
        let url = self.fragment_url(fragment, language, idx, total)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PapercastError::Synthesis(format!("TTS request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PapercastError::Synthesis(format!(
                "TTS endpoint returned {} for fragment {}/{}",
                status,
                idx + 1,
                total
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PapercastError::Synthesis(format!("TTS response unreadable: {}", e)))?;
        if body.is_empty() {
            return Err(PapercastError::Synthesis(format!(
                "TTS endpoint returned no audio for fragment {}/{}",
                idx + 1,
                total
            )));
        }

        Ok(body.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleSpeech {
    #[instrument(skip(self, text), fields(chars = text.len(), language = %language))]
    async fn synthesize(&self, text: &str, language: &str) -> Result<PathBuf> {
        if text.trim().is_empty() {
            return Err(PapercastError::Synthesis("No text to speak".to_string()));
        }
        validate_language(language)?;
        let language = language.trim();

        let fragments = split_text(text, MAX_FRAGMENT_CHARS);
        if fragments.is_empty() {
            return Err(PapercastError::Synthesis("No text to speak".to_string()));
        }
        let total = fragments.len();
        debug!("Synthesizing {} fragments", total);

        let requests: Vec<_> = fragments
            .iter()
            .enumerate()
            .map(|(idx, fragment)| self.fetch_fragment(fragment, language, idx, total))
            .collect();
        let parts: Vec<Result<Vec<u8>>> = stream::iter(requests)
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let mut audio = Vec::new();
        for part in parts {
            audio.extend(part?);
        }

        let path = write_audio_file(&self.audio_dir, &audio)?;
        info!("Wrote {} bytes of audio to {}", audio.len(), path.display());
        Ok(path)
    }
}

/// Sentence punctuation followed by whitespace or end of input, or a line break.
fn sentence_break() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[.!?;:]+(?:\s+|$)|\n+").expect("valid sentence regex"))
}

fn sentences(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    for m in sentence_break().find_iter(text) {
        segments.push(&text[start..m.end()]);
        start = m.end();
    }
    segments.push(&text[start..]);
    segments
}

/// Split text into speakable fragments of at most `max_chars` characters.
///
/// Breaks fall on sentence punctuation first, then on whitespace; a single word
/// longer than the limit is cut mid-word. Segments with nothing to pronounce are
/// dropped. Short neighbours are merged back together so the number of requests
/// stays low.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();

    for segment in sentences(text) {
        let segment = segment.trim();
        if !segment.chars().any(char::is_alphanumeric) {
            continue;
        }
        if segment.chars().count() <= max_chars {
            pieces.push(segment.to_string());
        } else {
            split_words(segment, max_chars, &mut pieces);
        }
    }

    merge_short(pieces, max_chars)
}

fn split_words(segment: &str, max_chars: usize, out: &mut Vec<String>) {
    let mut current = String::new();
    let mut current_len = 0;

    for word in segment.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            out.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            out.push(std::mem::replace(&mut current, word.to_string()));
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        out.push(current);
    }
}

fn merge_short(pieces: Vec<String>, max_chars: usize) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(pieces.len());

    for piece in pieces {
        match merged.last_mut() {
            Some(last) if last.chars().count() + 1 + piece.chars().count() <= max_chars => {
                last.push(' ');
                last.push_str(&piece);
            }
            _ => merged.push(piece),
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_short_sentences_merge() {
        let pieces = split_text("Hello world. How are you?", MAX_FRAGMENT_CHARS);
        assert_eq!(pieces, vec!["Hello world. How are you?"]);
    }

    #[test]
    fn test_long_text_respects_limit_and_keeps_words() {
        let text = "Transformers replace recurrence with attention. ".repeat(12)
            + "This sentence has no punctuation for a very long stretch so it must be broken up on whitespace somewhere along the way";
        let pieces = split_text(&text, MAX_FRAGMENT_CHARS);

        assert!(pieces.len() > 1);
        assert!(pieces.iter().all(|p| p.chars().count() <= MAX_FRAGMENT_CHARS));
        assert_eq!(words(&pieces.join(" ")), words(&text));
    }

    #[test]
    fn test_overlong_word_is_cut() {
        let word = "x".repeat(250);
        let pieces = split_text(&word, MAX_FRAGMENT_CHARS);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces.concat(), word);
    }

    #[test]
    fn test_blank_text_has_no_fragments() {
        assert!(split_text("  \n ", MAX_FRAGMENT_CHARS).is_empty());
    }

    #[test]
    fn test_punctuation_only_has_no_fragments() {
        assert!(split_text("?!...", MAX_FRAGMENT_CHARS).is_empty());
        assert!(split_text(" ... ;\n!", MAX_FRAGMENT_CHARS).is_empty());
    }

    #[test]
    fn test_decimals_and_inner_dots_stay_whole() {
        let pieces = split_text("Pi is 3.14 today. See arxiv.org now.", 20);
        assert_eq!(pieces, vec!["Pi is 3.14 today.", "See arxiv.org now."]);
    }

    #[test]
    fn test_fragment_url_encodes_text() {
        let dir = tempfile::tempdir().unwrap();
        let speech = GoogleSpeech::new(&SpeechSettings::default(), dir.path().to_path_buf()).unwrap();

        let url = speech.fragment_url("a & b?", "en", 0, 2).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("q".to_string(), "a & b?".to_string())));
        assert!(pairs.contains(&("tl".to_string(), "en".to_string())));
        assert!(pairs.contains(&("total".to_string(), "2".to_string())));
        assert!(pairs.contains(&("textlen".to_string(), "6".to_string())));
    }

    #[tokio::test]
    async fn test_rejects_empty_text_and_unknown_language() {
        let dir = tempfile::tempdir().unwrap();
        let speech = GoogleSpeech::new(&SpeechSettings::default(), dir.path().to_path_buf()).unwrap();

        let err = speech.synthesize("   ", "en").await.unwrap_err();
        assert!(matches!(err, PapercastError::Synthesis(_)));

        let err = speech.synthesize("hello", "xx-not-real").await.unwrap_err();
        assert!(matches!(err, PapercastError::Synthesis(_)));
    }

    #[tokio::test]
    async fn test_punctuation_only_is_rejected_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let speech = GoogleSpeech::new(&SpeechSettings::default(), dir.path().to_path_buf()).unwrap();

        let err = speech.synthesize("?!...", "en").await.unwrap_err();
        assert_eq!(err.to_string(), "Speech synthesis failed: No text to speak");
        assert!(!dir.path().exists() || std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    /// Local stand-in for the TTS endpoint: answers `<idx>` per fragment,
    /// later fragments first, or 503 on `/down`.
    async fn spawn_endpoint() -> String {
        use axum::extract::Query;
        use axum::http::StatusCode;
        use axum::routing::get;
        use std::collections::HashMap;

        async fn tts(Query(params): Query<HashMap<String, String>>) -> Vec<u8> {
            let idx: u64 = params.get("idx").and_then(|i| i.parse().ok()).unwrap_or(0);
            let total: u64 = params.get("total").and_then(|t| t.parse().ok()).unwrap_or(1);
            tokio::time::sleep(Duration::from_millis((total - idx) * 30)).await;
            format!("<{}>", idx).into_bytes()
        }

        let app = axum::Router::new()
            .route("/translate_tts", get(tts))
            .route("/down", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn local_speech(endpoint: String, dir: &std::path::Path) -> GoogleSpeech {
        let settings = SpeechSettings {
            endpoint,
            max_concurrent: 4,
            ..SpeechSettings::default()
        };
        GoogleSpeech::new(&settings, dir.to_path_buf()).unwrap()
    }

    #[tokio::test]
    async fn test_fragments_are_concatenated_in_order() {
        let base = spawn_endpoint().await;
        let dir = tempfile::tempdir().unwrap();
        let speech = local_speech(format!("{}/translate_tts", base), dir.path());

        let text = "Attention layers let every token look at every other token in the sequence. "
            .repeat(3);
        let total = split_text(&text, MAX_FRAGMENT_CHARS).len();
        assert_eq!(total, 3);

        let path = speech.synthesize(&text, "en").await.unwrap();
        let audio = std::fs::read(&path).unwrap();
        assert_eq!(audio, b"<0><1><2>");
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap()
            .starts_with(crate::speech::AUDIO_FILE_PREFIX));
    }

    #[tokio::test]
    async fn test_endpoint_error_is_synthesis_error() {
        let base = spawn_endpoint().await;
        let dir = tempfile::tempdir().unwrap();
        let speech = local_speech(format!("{}/down", base), dir.path());

        let err = speech.synthesize("Hello listeners.", "en").await.unwrap_err();
        assert!(matches!(err, PapercastError::Synthesis(_)));
        assert!(err.to_string().contains("503"));
    }
}
