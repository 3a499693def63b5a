//! Chat session controller.
//!
//! [`Session`] owns the transcript and the last known connectivity. Front-ends
//! feed it [`Action`]s and carry out the [`Effect`]s it returns; results come
//! back as further actions. Nothing here performs IO, so every rule about
//! when a message is sent or what gets appended is checked without a network.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::connectivity::Connectivity;
use crate::error::{ClientError, DownloadError};
use crate::protocol::ChatReply;
use crate::transcript::{ChatMessage, Transcript};

#[derive(Debug)]
pub enum Action {
    /// User pressed send.
    Submit(String),
    ChatSettled(Result<ChatReply, ClientError>),
    HealthPolled(Connectivity),
    /// User picked a file reference.
    Download(String),
    DownloadSettled {
        filename: String,
        result: Result<PathBuf, DownloadError>,
    },
    Clear,
}

/// Work the front-end must start on the session's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SendChat(String),
    Download(String),
}

#[derive(Debug)]
pub struct Session {
    connectivity: Connectivity,
    transcript: Transcript,
    awaiting_reply: bool,
    last_download: Option<PathBuf>,
}

impl Session {
    pub fn new(welcome: Option<&str>) -> Self {
        let transcript = match welcome {
            Some(text) => Transcript::with_welcome(text),
            None => Transcript::new(),
        };
        Self {
            connectivity: Connectivity::unknown(),
            transcript,
            awaiting_reply: false,
            last_download: None,
        }
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// True while a chat request is outstanding ("typing" placeholder shown).
    pub fn awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn can_send(&self) -> bool {
        !self.awaiting_reply
    }

    pub fn last_download(&self) -> Option<&PathBuf> {
        self.last_download.as_ref()
    }

    pub fn apply(&mut self, action: Action) -> Option<Effect> {
        match action {
            Action::Submit(text) => self.submit(&text),
            Action::ChatSettled(result) => {
                self.chat_settled(result);
                None
            }
            Action::HealthPolled(connectivity) => {
                self.update_connectivity(connectivity);
                None
            }
            Action::Download(filename) => {
                debug!(%filename, "download requested");
                Some(Effect::Download(filename))
            }
            Action::DownloadSettled { filename, result } => {
                self.download_settled(filename, result);
                None
            }
            Action::Clear => {
                self.transcript.clear();
                None
            }
        }
    }

    /// Record a poll result. Returns true (and logs) only on a change.
    fn update_connectivity(&mut self, connectivity: Connectivity) -> bool {
        if connectivity == self.connectivity {
            return false;
        }
        info!(from = %self.connectivity, to = %connectivity, "connectivity changed");
        self.connectivity = connectivity;
        true
    }

    fn submit(&mut self, text: &str) -> Option<Effect> {
        let text = text.trim();
        if text.is_empty() || !self.can_send() {
            return None;
        }

        if !self.connectivity.is_online() {
            debug!(connectivity = %self.connectivity, "send blocked");
            self.transcript.push(ChatMessage::warning(format!(
                "The assistant is {} ({}), so your message was not sent. Please try again once it is back online.",
                self.connectivity.state.label().to_lowercase(),
                self.connectivity.reason,
            )));
            return None;
        }

        self.transcript.push(ChatMessage::user(text));
        self.awaiting_reply = true;
        Some(Effect::SendChat(text.to_string()))
    }

    fn chat_settled(&mut self, result: Result<ChatReply, ClientError>) {
        self.awaiting_reply = false;
        match result {
            Ok(reply) => {
                let files = reply.file_refs().to_vec();
                self.transcript
                    .push(ChatMessage::assistant(reply.response).with_files(files));
            }
            Err(e) => {
                warn!(error = %e, "chat request failed");
                self.transcript
                    .push(ChatMessage::error(e.kind().user_message()));
            }
        }
    }

    fn download_settled(&mut self, filename: String, result: Result<PathBuf, DownloadError>) {
        match result {
            Ok(path) => {
                info!(%filename, path = %path.display(), "download saved");
                self.last_download = Some(path);
            }
            Err(e) => {
                warn!(%filename, error = %e, "download failed");
                self.transcript.push(ChatMessage::error(format!(
                    "Failed to download {}: {}",
                    filename, e
                )));
            }
        }
    }
}
