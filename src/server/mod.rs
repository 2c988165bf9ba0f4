//! HTTP API.
//!
//! Endpoints:
//! - GET    /                      - Web client
//! - GET    /health                - Liveness probe
//! - POST   /upload_paper          - Upload a PDF, get its text and a summary
//! - GET    /get_pdf/{file_id}     - Re-serve an uploaded PDF
//! - DELETE /pdf/{file_id}         - Forget an upload and delete its file
//! - POST   /summarize_selection   - Summarize highlighted text
//! - POST   /chat_with_paper       - Answer a question about the paper
//! - POST   /generate_podcast      - Write a narration script
//! - POST   /generate_audio        - Synthesize speech as MP3
//! - POST   /convert_to_notes      - Turn text into study notes

mod error;
mod handlers;

pub use handlers::AUDIO_DOWNLOAD_NAME;

use crate::generation::ContentTransformer;
use crate::pdf::TextExtractor;
use crate::registry::UploadRegistry;
use crate::speech::SpeechSynthesizer;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state, injected into every handler.
pub struct AppState {
    pub transformer: ContentTransformer,
    pub extractor: Arc<dyn TextExtractor>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub registry: Arc<UploadRegistry>,
    pub upload_dir: PathBuf,
    /// Language used by `/generate_audio` when the request names none.
    pub default_voice: String,
    /// Request body limit, applied to uploads and JSON payloads alike.
    pub max_upload_bytes: usize,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/upload_paper", post(handlers::upload_paper))
        .route("/get_pdf/{file_id}", get(handlers::get_pdf))
        .route("/pdf/{file_id}", delete(handlers::delete_pdf))
        .route("/summarize_selection", post(handlers::summarize_selection))
        .route("/chat_with_paper", post(handlers::chat_with_paper))
        .route("/generate_podcast", post(handlers::generate_podcast))
        .route("/generate_audio", post(handlers::generate_audio))
        .route("/convert_to_notes", post(handlers::convert_to_notes))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
