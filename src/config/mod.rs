//! Configuration module for Papercast.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{PromptPair, Prompts, SummaryPrompts};
pub use settings::{
    GeneralSettings, LlmSettings, PromptSettings, RetentionSettings, ServerSettings, Settings,
    SpeechSettings,
};
