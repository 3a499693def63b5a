//! Wire types shared by the backend and its clients.
//!
//! Field names match the JSON the backend has always produced, so older
//! front-ends keep working against the Rust server and vice versa.

use serde::{Deserialize, Serialize};

/// Sentinel reported in [`HealthReport::status`] when the backend is fine.
pub const STATUS_HEALTHY: &str = "healthy";

/// Sentinel reported in [`HealthReport::ollama`] when the model runtime answers.
pub const OLLAMA_CONNECTED: &str = "connected";

pub const OLLAMA_DISCONNECTED: &str = "disconnected";

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub ollama: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents_loaded: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == STATUS_HEALTHY
    }

    pub fn runtime_connected(&self) -> bool {
        self.ollama == OLLAMA_CONNECTED
    }
}

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// A document the user can fetch from `/download/{filename}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl FileRef {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            path: None,
        }
    }

    /// Reference carrying the server-relative download path.
    pub fn downloadable(filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let path = Some(format!("/download/{}", filename));
        Self { filename, path }
    }
}

/// Response of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub files: Option<Vec<FileRef>>,
}

impl ChatReply {
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            files: None,
        }
    }

    /// Attached files, treating an absent list and an empty list the same.
    pub fn file_refs(&self) -> &[FileRef] {
        self.files.as_deref().unwrap_or(&[])
    }
}

/// Response of `GET /documents`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentListing {
    pub documents: Vec<String>,
    pub count: usize,
    pub directory: String,
}

/// Response of `GET /`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    pub status: String,
    pub model: String,
    pub documents: usize,
}
