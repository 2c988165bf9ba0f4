//! Request handlers.

use super::error::{json_body, required};
use super::AppState;
use crate::error::{PapercastError, Result};
use crate::orchestrator::extract_file;
use crate::registry::{new_file_id, UploadRecord};
use crate::storage::{is_allowed_file, save_upload};
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Download name of synthesized audio.
pub const AUDIO_DOWNLOAD_NAME: &str = "research_audio.mp3";

// === Request/Response Types ===

#[derive(Serialize)]
pub struct UploadResponse {
    pub file_id: String,
    pub paper_content: String,
    pub summary: String,
    pub filename: String,
}

#[derive(Deserialize)]
pub struct SelectionRequest {
    #[serde(default)]
    selected_text: Option<String>,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    summary: String,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    paper_content: Option<String>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    selected_text: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    response: String,
}

#[derive(Deserialize)]
pub struct PodcastRequest {
    #[serde(default)]
    paper_content: Option<String>,
}

#[derive(Serialize)]
pub struct PodcastResponse {
    podcast_script: String,
}

#[derive(Deserialize)]
pub struct AudioRequest {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    voice: Option<String>,
}

#[derive(Deserialize)]
pub struct NotesRequest {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
pub struct NotesResponse {
    notes: String,
}

// === Handlers ===

pub async fn index() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[instrument(skip_all)]
pub async fn upload_paper(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let mut multipart =
        multipart.map_err(|_| PapercastError::Validation("No file part".to_string()))?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PapercastError::Validation(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| PapercastError::Validation(format!("Malformed upload: {}", e)))?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) =
        upload.ok_or_else(|| PapercastError::Validation("No file part".to_string()))?;
    if filename.is_empty() {
        return Err(PapercastError::Validation("No selected file".to_string()));
    }
    if !is_allowed_file(&filename) {
        return Err(PapercastError::Validation("Invalid file type".to_string()));
    }

    let file_id = new_file_id();
    let stored = save_upload(&state.upload_dir, &file_id, &filename, &data).await?;
    let path = stored.path.clone();
    let saved_name = stored.filename;

    let record = UploadRecord::new(file_id.clone(), path.clone(), saved_name.clone());
    if state.registry.put(record).is_some() {
        info!("File id {} reused, previous upload replaced", file_id);
    }
    info!("Stored {} as {} ({} bytes)", saved_name, file_id, data.len());

    let paper_content = extract_file(state.extractor.clone(), path).await?;

    let summary = state.transformer.summarize(&paper_content).await?;

    Ok(Json(UploadResponse {
        file_id,
        paper_content,
        summary,
        filename: saved_name,
    }))
}

#[instrument(skip(state))]
pub async fn get_pdf(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> Result<Response> {
    let record = state
        .registry
        .get(&file_id)
        .ok_or_else(|| PapercastError::NotFound("PDF not found".to_string()))?;

    let data = match tokio::fs::read(&record.path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PapercastError::NotFound("PDF not found".to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", record.filename),
            ),
        ],
        data,
    )
        .into_response())
}

#[instrument(skip(state))]
pub async fn delete_pdf(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> Result<impl IntoResponse> {
    let record = state
        .registry
        .remove(&file_id)
        .ok_or_else(|| PapercastError::NotFound("PDF not found".to_string()))?;

    let still_referenced = state.registry.paths().contains(&record.path);
    if !still_referenced {
        match tokio::fs::remove_file(&record.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }

    info!("Deleted upload {}", file_id);
    Ok(Json(serde_json::json!({ "deleted": file_id })))
}

#[instrument(skip_all)]
pub async fn summarize_selection(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SelectionRequest>, JsonRejection>,
) -> Result<Json<SummaryResponse>> {
    let req = json_body(payload)?;
    let selected_text = required(req.selected_text, "No text selected")?;

    let summary = state.transformer.summarize_selection(&selected_text).await?;
    Ok(Json(SummaryResponse { summary }))
}

#[instrument(skip_all)]
pub async fn chat_with_paper(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let req = json_body(payload)?;
    let message = "Missing paper content or question";
    let paper_content = required(req.paper_content, message)?;
    let question = required(req.question, message)?;

    let response = state
        .transformer
        .chat(&paper_content, &question, req.selected_text.as_deref())
        .await?;
    Ok(Json(ChatResponse { response }))
}

#[instrument(skip_all)]
pub async fn generate_podcast(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<PodcastRequest>, JsonRejection>,
) -> Result<Json<PodcastResponse>> {
    let req = json_body(payload)?;
    let paper_content = required(req.paper_content, "Missing paper content")?;

    let podcast_script = state.transformer.podcast_script(&paper_content).await?;
    Ok(Json(PodcastResponse { podcast_script }))
}

#[instrument(skip_all)]
pub async fn generate_audio(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<AudioRequest>, JsonRejection>,
) -> Result<Response> {
    let req = json_body(payload)?;
    let text = required(req.text, "Text not provided")?;
    let voice = req
        .voice
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| state.default_voice.clone());

    let path = state.synthesizer.synthesize(&text, &voice).await?;
    let audio = tokio::fs::read(&path).await?;
    info!("Serving {} bytes of audio from {}", audio.len(), path.display());

    Ok((
        [
            (header::CONTENT_TYPE, "audio/mpeg".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", AUDIO_DOWNLOAD_NAME),
            ),
        ],
        audio,
    )
        .into_response())
}

#[instrument(skip_all)]
pub async fn convert_to_notes(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<NotesRequest>, JsonRejection>,
) -> Result<Json<NotesResponse>> {
    let req = json_body(payload)?;
    let text = required(req.text, "No text provided")?;

    let notes = state.transformer.notes(&text).await?;
    Ok(Json(NotesResponse { notes }))
}
