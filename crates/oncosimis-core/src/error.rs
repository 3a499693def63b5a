use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single request to the assistant backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced an HTTP response (refused, DNS, reset).
    #[error("could not reach backend: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("backend returned HTTP {0}")]
    Status(StatusCode),

    /// 2xx response whose body did not match the expected shape.
    #[error("unexpected response from backend: {0}")]
    Decode(#[source] reqwest::Error),
}

/// User-facing category of a failed chat request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Connection,
    NotFound,
    Server,
    Other,
}

impl ClientError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ClientError::Transport(_) => FailureKind::Connection,
            ClientError::Status(status) if *status == StatusCode::NOT_FOUND => {
                FailureKind::NotFound
            }
            ClientError::Status(status) if status.is_server_error() => FailureKind::Server,
            ClientError::Status(_) | ClientError::Decode(_) => FailureKind::Other,
        }
    }
}

impl FailureKind {
    /// Text shown in the transcript when a chat request fails.
    pub fn user_message(&self) -> &'static str {
        match self {
            FailureKind::Connection => {
                "Unable to connect to the assistant. Please check that the backend is running and try again."
            }
            FailureKind::NotFound => {
                "The chat service could not be found on the backend (404). Please check the backend address."
            }
            FailureKind::Server => {
                "The backend ran into an internal error (500). Please try again in a moment."
            }
            FailureKind::Other => "Sorry, something went wrong while getting a response. Please try again.",
        }
    }
}

/// Failure of the file download relay.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Fetch(#[from] ClientError),

    #[error("refusing to save file with unsafe name '{0}'")]
    InvalidName(String),

    #[error("could not save file: {0}")]
    Save(#[from] std::io::Error),
}
