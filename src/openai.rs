//! OpenAI-compatible client configuration.
//!
//! The language model is reached through `async-openai`, pointed at whichever
//! OpenAI-compatible API base the settings name (Cerebras by default).

use crate::config::LlmSettings;
use crate::error::{PapercastError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create a chat client for the configured API base, key and timeout.
pub fn create_client(settings: &LlmSettings, api_key: &str) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()
        .map_err(|e| PapercastError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let config = OpenAIConfig::new()
        .with_api_base(&settings.api_base)
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}
