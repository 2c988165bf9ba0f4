//! Summarize command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use std::path::Path;

/// Summarize a PDF from the command line.
pub async fn run_summarize(input: &str, notes: bool, settings: Settings) -> Result<()> {
    let api_key = match preflight::check(Operation::Summarize, &settings) {
        Ok(key) => key.unwrap_or_default(),
        Err(e) => {
            Output::error(&format!("{}", e));
            Output::info("Run 'papercast doctor' for detailed diagnostics.");
            return Err(e.into());
        }
    };

    let orchestrator = Orchestrator::new(settings, &api_key)?;

    let spinner = Output::spinner(if notes {
        "Writing study notes..."
    } else {
        "Summarizing paper..."
    });

    match orchestrator.summarize_file(Path::new(input), notes).await {
        Ok(text) => {
            spinner.finish_and_clear();
            println!("\n{}\n", text);
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to summarize {}: {}", input, e));
            return Err(e.into());
        }
    }

    Ok(())
}
