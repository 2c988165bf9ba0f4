//! HTTP server command.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::server;
use tracing::info;

/// Run the HTTP server.
///
/// Refuses to start when the language model API key is missing.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    let api_key = match preflight::check(Operation::Serve, &settings) {
        Ok(key) => key.unwrap_or_default(),
        Err(e) => {
            Output::error(&format!("{}", e));
            Output::info("Run 'papercast doctor' for detailed diagnostics.");
            return Err(e.into());
        }
    };

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let orchestrator = Orchestrator::new(settings, &api_key)?;
    let app = server::router(orchestrator.app_state());

    let janitor = orchestrator.janitor().map(|(janitor, interval)| {
        info!("Purging uploads and audio every {}s", interval.as_secs());
        janitor.spawn(interval)
    });

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Papercast Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Web client", "GET    /");
    Output::kv("Upload", "POST   /upload_paper");
    Output::kv("View PDF", "GET    /get_pdf/{file_id}");
    Output::kv("Delete PDF", "DELETE /pdf/{file_id}");
    Output::kv("Summarize", "POST   /summarize_selection");
    Output::kv("Chat", "POST   /chat_with_paper");
    Output::kv("Podcast", "POST   /generate_podcast");
    Output::kv("Audio", "POST   /generate_audio");
    Output::kv("Notes", "POST   /convert_to_notes");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = janitor {
        handle.abort();
    }
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
