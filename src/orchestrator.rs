//! Service wiring for Papercast.
//!
//! Builds the collaborators named in the settings and hands them to the
//! HTTP layer or the CLI.

use crate::config::{Prompts, Settings};
use crate::error::{PapercastError, Result};
use crate::generation::{ContentTransformer, OpenAICompletion};
use crate::pdf::{PdfTextExtractor, TextExtractor};
use crate::registry::UploadRegistry;
use crate::server::AppState;
use crate::speech::{GoogleSpeech, SpeechSynthesizer};
use crate::storage::Janitor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// Owns every service the application needs.
pub struct Orchestrator {
    settings: Settings,
    transformer: ContentTransformer,
    extractor: Arc<dyn TextExtractor>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    registry: Arc<UploadRegistry>,
}

impl Orchestrator {
    /// Create the production services. `api_key` authenticates the language model.
    pub fn new(settings: Settings, api_key: &str) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let model = OpenAICompletion::new(&settings.llm, api_key)?;
        info!("Using {} at {}", model.model(), settings.llm.api_base);
        let transformer = ContentTransformer::new(Arc::new(model)).with_prompts(prompts);

        let upload_dir = settings.upload_dir();
        let audio_dir = settings.audio_dir();
        std::fs::create_dir_all(&upload_dir)?;
        std::fs::create_dir_all(&audio_dir)?;

        let synthesizer = GoogleSpeech::new(&settings.speech, audio_dir)?;

        Ok(Self {
            settings,
            transformer,
            extractor: Arc::new(PdfTextExtractor::new()),
            synthesizer: Arc::new(synthesizer),
            registry: Arc::new(UploadRegistry::new()),
        })
    }

    /// Shared state for the HTTP router.
    pub fn app_state(&self) -> Arc<AppState> {
        Arc::new(AppState {
            transformer: self.transformer.clone(),
            extractor: self.extractor.clone(),
            synthesizer: self.synthesizer.clone(),
            registry: self.registry.clone(),
            upload_dir: self.settings.upload_dir(),
            default_voice: self.settings.speech.default_language.clone(),
            max_upload_bytes: self.settings.server.max_upload_bytes(),
        })
    }

    /// Retention janitor, or None when retention is disabled.
    pub fn janitor(&self) -> Option<(Janitor, Duration)> {
        let retention = &self.settings.retention;
        if retention.retention_secs == 0 {
            return None;
        }

        let janitor = Janitor::new(
            self.registry.clone(),
            self.settings.upload_dir(),
            self.settings.audio_dir(),
            Duration::from_secs(retention.retention_secs),
        );
        Some((janitor, Duration::from_secs(retention.sweep_interval_secs.max(1))))
    }

    /// Summarize a PDF on disk, or turn it into study notes.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn summarize_file(&self, path: &Path, notes: bool) -> Result<String> {
        let text = extract_file(self.extractor.clone(), path.to_path_buf()).await?;
        if notes {
            self.transformer.notes(&text).await
        } else {
            self.transformer.summarize(&text).await
        }
    }
}

/// Run an extractor on the blocking pool.
pub async fn extract_file(extractor: Arc<dyn TextExtractor>, path: PathBuf) -> Result<String> {
    tokio::task::spawn_blocking(move || extractor.extract(&path))
        .await
        .map_err(|e| PapercastError::Extraction(format!("Extraction task failed: {}", e)))?
}
