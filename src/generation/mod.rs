//! Content generation through a hosted language model.
//!
//! Every endpoint that produces text goes through [`ContentTransformer::transform`],
//! which picks the prompt pair and completion parameters for a [`TaskKind`],
//! fills the template and hands the result to a [`LanguageModel`].

mod openai;
mod script;

pub use openai::OpenAICompletion;
pub use script::{clean_podcast_script, truncate_chars};

use crate::config::Prompts;
use crate::error::{PapercastError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Maximum characters of caller text placed into summary, chat and podcast prompts.
pub const MAX_PROMPT_CHARS: usize = 3000;

/// Sampling temperature shared by every task.
pub const TEMPERATURE: f32 = 0.7;

/// A fully rendered request for the language model.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Trait for language model backends.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion and return its raw text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// The kinds of text the service can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Summarize,
    SummarizeSelection,
    Chat,
    PodcastScript,
    Notes,
}

impl TaskKind {
    /// Output token budget for this task.
    pub fn max_tokens(self) -> u32 {
        match self {
            TaskKind::Summarize | TaskKind::SummarizeSelection | TaskKind::Chat => 500,
            TaskKind::PodcastScript | TaskKind::Notes => 1000,
        }
    }

    /// Character limit applied to caller text, if any.
    pub fn input_limit(self) -> Option<usize> {
        match self {
            TaskKind::Notes => None,
            _ => Some(MAX_PROMPT_CHARS),
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::Summarize => write!(f, "summarize"),
            TaskKind::SummarizeSelection => write!(f, "summarize-selection"),
            TaskKind::Chat => write!(f, "chat"),
            TaskKind::PodcastScript => write!(f, "podcast-script"),
            TaskKind::Notes => write!(f, "notes"),
        }
    }
}

/// Prompt-driven text generation service.
#[derive(Clone)]
pub struct ContentTransformer {
    model: Arc<dyn LanguageModel>,
    prompts: Prompts,
}

impl ContentTransformer {
    /// Create a transformer with the default prompts.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Build the completion request for a task without sending it.
    pub fn build_request(
        &self,
        kind: TaskKind,
        text: &str,
        question: Option<&str>,
    ) -> CompletionRequest {
        let text = match kind.input_limit() {
            Some(limit) => truncate_chars(text, limit),
            None => text,
        };

        let mut vars = HashMap::new();
        let (system, template) = match kind {
            TaskKind::Summarize | TaskKind::SummarizeSelection => {
                let subject = if kind == TaskKind::SummarizeSelection {
                    "selected text"
                } else {
                    "research paper"
                };
                vars.insert("subject".to_string(), subject.to_string());
                vars.insert("content".to_string(), text.to_string());
                (&self.prompts.summary.system, &self.prompts.summary.user)
            }
            TaskKind::Chat => {
                vars.insert("context".to_string(), text.to_string());
                vars.insert("question".to_string(), question.unwrap_or_default().to_string());
                (&self.prompts.chat.system, &self.prompts.chat.user)
            }
            TaskKind::PodcastScript => {
                vars.insert("content".to_string(), text.to_string());
                (&self.prompts.podcast.system, &self.prompts.podcast.user)
            }
            TaskKind::Notes => {
                vars.insert("content".to_string(), text.to_string());
                (&self.prompts.notes.system, &self.prompts.notes.user)
            }
        };

        CompletionRequest {
            system: self.prompts.render_with_custom(system, &HashMap::new()),
            user: self.prompts.render_with_custom(template, &vars),
            max_tokens: kind.max_tokens(),
            temperature: TEMPERATURE,
        }
    }

    /// Run one generation task and return the model's text.
    ///
    /// Podcast scripts are cleaned of speaker markers; every other kind is returned raw.
    #[instrument(skip(self, text, question), fields(kind = %kind, chars = text.len()))]
    pub async fn transform(
        &self,
        kind: TaskKind,
        text: &str,
        question: Option<&str>,
    ) -> Result<String> {
        let request = self.build_request(kind, text, question);
        debug!("Prompt is {} chars", request.user.len());

        let output = self.model.complete(&request).await?;
        info!("Generated {} chars", output.len());

        Ok(match kind {
            TaskKind::PodcastScript => clean_podcast_script(&output),
            _ => output,
        })
    }

    /// Summarize a whole paper.
    pub async fn summarize(&self, paper_content: &str) -> Result<String> {
        self.transform(TaskKind::Summarize, paper_content, None).await
    }

    /// Summarize a user-selected excerpt.
    pub async fn summarize_selection(&self, selected_text: &str) -> Result<String> {
        self.transform(TaskKind::SummarizeSelection, selected_text, None)
            .await
    }

    /// Answer a question about the paper.
    ///
    /// A non-blank selection is used as context in place of the paper content.
    pub async fn chat(
        &self,
        paper_content: &str,
        question: &str,
        selected_text: Option<&str>,
    ) -> Result<String> {
        let context = match selected_text {
            Some(selection) if !selection.trim().is_empty() => selection,
            _ => paper_content,
        };
        self.transform(TaskKind::Chat, context, Some(question)).await
    }

    /// Write a narration script suitable for speech synthesis.
    pub async fn podcast_script(&self, paper_content: &str) -> Result<String> {
        self.transform(TaskKind::PodcastScript, paper_content, None)
            .await
    }

    /// Convert text into structured study notes.
    pub async fn notes(&self, text: &str) -> Result<String> {
        self.transform(TaskKind::Notes, text, None).await
    }
}

/// Map an empty completion to a generation error.
pub(crate) fn require_text(content: Option<String>) -> Result<String> {
    content.ok_or_else(|| PapercastError::Generation("Empty response from LLM".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Model that records every request and replies with a canned answer.
    struct RecordingModel {
        reply: String,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl RecordingModel {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn last(&self) -> CompletionRequest {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl LanguageModel for RecordingModel {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl LanguageModel for FailingModel {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
            Err(PapercastError::Generation("connection refused".to_string()))
        }
    }

    #[test]
    fn test_task_parameters() {
        assert_eq!(TaskKind::Summarize.max_tokens(), 500);
        assert_eq!(TaskKind::SummarizeSelection.max_tokens(), 500);
        assert_eq!(TaskKind::Chat.max_tokens(), 500);
        assert_eq!(TaskKind::PodcastScript.max_tokens(), 1000);
        assert_eq!(TaskKind::Notes.max_tokens(), 1000);
        assert_eq!(TaskKind::Notes.input_limit(), None);
        assert_eq!(TaskKind::Chat.input_limit(), Some(MAX_PROMPT_CHARS));
    }

    #[test]
    fn test_summary_truncates_input() {
        let transformer = ContentTransformer::new(RecordingModel::new(""));
        let text = format!("{}{}", "a".repeat(MAX_PROMPT_CHARS), "TAIL");

        let request = transformer.build_request(TaskKind::Summarize, &text, None);
        assert!(request.user.contains("research paper"));
        assert!(!request.user.contains("TAIL"));
        assert_eq!(request.temperature, TEMPERATURE);
    }

    #[test]
    fn test_notes_keep_full_input() {
        let transformer = ContentTransformer::new(RecordingModel::new(""));
        let text = format!("{}{}", "a".repeat(MAX_PROMPT_CHARS * 2), "TAIL");

        let request = transformer.build_request(TaskKind::Notes, &text, None);
        assert!(request.user.contains("TAIL"));
        assert_eq!(request.max_tokens, 1000);
    }

    #[test]
    fn test_placeholder_text_in_input_is_kept() {
        let transformer = ContentTransformer::new(RecordingModel::new(""));
        let context = "We compare {{question}} baselines on {{subject}}.";

        for _ in 0..64 {
            let request = transformer.build_request(TaskKind::Chat, context, Some("Why {{context}}?"));
            assert!(request.user.contains(context));
            assert!(request.user.contains("Why {{context}}?"));

            let request = transformer.build_request(TaskKind::Notes, context, None);
            assert!(request.user.contains(context));
        }
    }

    #[test]
    fn test_selection_subject() {
        let transformer = ContentTransformer::new(RecordingModel::new(""));
        let request = transformer.build_request(TaskKind::SummarizeSelection, "excerpt", None);
        assert!(request.user.starts_with("Summarize this selected text:"));
    }

    #[tokio::test]
    async fn test_chat_prefers_selection() {
        let model = RecordingModel::new("answer");
        let transformer = ContentTransformer::new(model.clone());

        let answer = transformer
            .chat("FULL PAPER", "What is new?", Some("HIGHLIGHTED"))
            .await
            .unwrap();

        assert_eq!(answer, "answer");
        let request = model.last();
        assert!(request.user.contains("HIGHLIGHTED"));
        assert!(!request.user.contains("FULL PAPER"));
        assert!(request.user.contains("What is new?"));
    }

    #[tokio::test]
    async fn test_chat_ignores_blank_selection() {
        let model = RecordingModel::new("answer");
        let transformer = ContentTransformer::new(model.clone());

        transformer.chat("FULL PAPER", "Why?", Some("   ")).await.unwrap();
        assert!(model.last().user.contains("FULL PAPER"));
    }

    #[tokio::test]
    async fn test_podcast_output_is_cleaned() {
        let model = RecordingModel::new("Host A: Hello\n\nHost B: there.  Q: ok A: fine");
        let transformer = ContentTransformer::new(model.clone());

        let script = transformer.podcast_script("paper").await.unwrap();
        assert_eq!(script, "Hello there. ok fine");
        assert_eq!(model.last().max_tokens, 1000);
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let transformer = ContentTransformer::new(Arc::new(FailingModel));
        let err = transformer.summarize("paper").await.unwrap_err();
        assert!(matches!(err, PapercastError::Generation(_)));
    }

    #[tokio::test]
    async fn test_custom_variables_reach_prompt() {
        let model = RecordingModel::new("ok");
        let mut prompts = Prompts::default();
        prompts.notes.user = "Notes for {{audience}}: {{content}}".to_string();
        prompts.variables.insert("audience".to_string(), "first-years".to_string());
        let transformer = ContentTransformer::new(model.clone()).with_prompts(prompts);

        transformer.notes("cells").await.unwrap();
        assert_eq!(model.last().user, "Notes for first-years: cells");
    }
}
