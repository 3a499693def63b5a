use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use oncosimis_core::protocol::{
    DocumentListing, ServiceInfo, OLLAMA_CONNECTED, OLLAMA_DISCONNECTED, STATUS_HEALTHY,
};
use oncosimis_core::{ChatReply, ChatRequest, HealthReport};
use tracing::{error, info};

use crate::error::ApiError;
use crate::intent::{self, Route};
use crate::prompt::build_prompt;
use crate::state::AppState;

/// Log-friendly prefix of a message.
fn preview(text: &str) -> String {
    text.chars().take(100).collect()
}

pub async fn root(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Oncosimis AI Assistant API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        model: state.ollama.model().to_string(),
        documents: state.documents.len(),
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let ollama = if state.ollama.is_running().await {
        OLLAMA_CONNECTED
    } else {
        OLLAMA_DISCONNECTED
    };

    Json(HealthReport {
        status: STATUS_HEALTHY.to_string(),
        ollama: ollama.to_string(),
        model: Some(state.ollama.model().to_string()),
        documents_loaded: Some(state.documents.len()),
        backend: Some("running".to_string()),
    })
}

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("Message cannot be empty".to_string()));
    }

    info!("User: {}", preview(message));

    let reply = match intent::route(message, state.documents.names()) {
        Route::Greeting => {
            info!("Greeting detected");
            ChatReply::text(intent::greeting_reply())
        }
        Route::Files(files) => {
            info!("Returning {} file(s)", files.len());
            ChatReply {
                response: intent::files_reply(&files),
                files: Some(files),
            }
        }
        Route::NoMatchingFiles => ChatReply::text(intent::NO_MATCHING_FILES),
        Route::Ask => {
            let prompt = build_prompt(&state.context, state.documents.content(), message);
            let answer = state.ollama.answer(&prompt).await;
            info!("AI: {}", preview(&answer));
            ChatReply::text(answer)
        }
    };

    Ok(Json(reply))
}

pub async fn documents(State(state): State<AppState>) -> Json<DocumentListing> {
    let directory = state.documents.directory();
    let directory = std::fs::canonicalize(directory).unwrap_or_else(|_| directory.to_path_buf());

    Json(DocumentListing {
        documents: state.documents.names().to_vec(),
        count: state.documents.len(),
        directory: directory.display().to_string(),
    })
}

pub async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    // Prevent directory traversal
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(ApiError::BadRequest("Invalid filename".to_string()));
    }

    let file_path = state.documents.directory().join(&filename);

    let metadata = match tokio::fs::metadata(&file_path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            error!("File not found: {}", filename);
            return Err(ApiError::NotFound(format!("File '{}' not found", filename)));
        }
        Err(e) => return Err(e.into()),
    };
    if !metadata.is_file() {
        return Err(ApiError::BadRequest("Invalid file".to_string()));
    }

    info!("Downloading: {}", filename);
    let bytes = tokio::fs::read(&file_path).await?;

    let disposition = format!("attachment; filename=\"{}\"", filename.replace('"', "'"));
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
