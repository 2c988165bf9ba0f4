//! Papercast - research papers in, summaries and podcasts out
//!
//! A small HTTP backend that accepts a PDF, extracts its text and uses a hosted
//! language model to produce summaries, answers, study notes and a narration
//! script, which a text-to-speech engine then turns into MP3 audio.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `pdf` - PDF text extraction
//! - `generation` - Prompt-driven text generation against an OpenAI-compatible API
//! - `speech` - Text-to-speech synthesis
//! - `registry` - In-memory lookup of uploaded files
//! - `storage` - Upload persistence and disk retention
//! - `server` - HTTP routes and error translation
//! - `orchestrator` - Wiring of the production services
//!
//! # Example
//!
//! ```rust,no_run
//! use papercast::config::Settings;
//! use papercast::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let api_key = settings.api_key()?;
//!     let orchestrator = Orchestrator::new(settings, &api_key)?;
//!
//!     let summary = orchestrator
//!         .summarize_file(std::path::Path::new("paper.pdf"), false)
//!         .await?;
//!     println!("{}", summary);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod openai;
pub mod orchestrator;
pub mod pdf;
pub mod registry;
pub mod server;
pub mod speech;
pub mod storage;

pub use error::{PapercastError, Result};
