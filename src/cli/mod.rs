//! CLI module for Papercast.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Papercast - research papers to summaries, answers, notes and podcasts
///
/// Serves a small web app that extracts text from uploaded PDFs and runs it
/// through a hosted language model and a text-to-speech engine.
#[derive(Parser, Debug)]
#[command(name = "papercast")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (defaults to server.host from config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port from config, 5000)
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
    },

    /// Extract the text of a PDF and print it
    Extract {
        /// Path to the PDF file
        input: String,

        /// Write the text to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Summarize a PDF with the configured language model
    Summarize {
        /// Path to the PDF file
        input: String,

        /// Produce study notes instead of a short summary
        #[arg(long)]
        notes: bool,
    },

    /// Check configuration and environment
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the current configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["papercast", "-v", "serve", "--port", "8080"]).unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Serve { host, port } => {
                assert!(host.is_none());
                assert_eq!(port, Some(8080));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_summarize_notes() {
        let cli = Cli::try_parse_from(["papercast", "summarize", "paper.pdf", "--notes"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Summarize { ref input, notes: true } if input == "paper.pdf"
        ));
    }
}
