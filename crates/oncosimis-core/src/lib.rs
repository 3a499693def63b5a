pub mod client;
pub mod config;
pub mod connectivity;
pub mod downloads;
pub mod error;
pub mod monitor;
pub mod protocol;
pub mod session;
pub mod transcript;

// Re-export main types for convenience
pub use client::BackendClient;
pub use config::Config;
pub use connectivity::{Connectivity, ConnectivityState};
pub use error::{ClientError, DownloadError, FailureKind};
pub use protocol::{ChatReply, ChatRequest, FileRef, HealthReport};
pub use session::{Action, Effect, Session};
pub use transcript::{ChatMessage, ChatRole, MessageKind, Transcript};
