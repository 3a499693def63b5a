//! UI-agnostic conversation types
//!
//! The transcript is the ordered list of entries shown to the user. It only
//! lives in memory and is owned by the [`Session`](crate::session::Session).

use crate::protocol::FileRef;

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    #[default]
    Text,
    /// Local notice, e.g. sending while the backend is offline.
    Warning,
    Error,
}

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub kind: MessageKind,
    pub files: Vec<FileRef>,
    /// Survives [`Transcript::clear`] when it is the first entry.
    pub pinned: bool,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, MessageKind::Text, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, MessageKind::Text, content)
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, MessageKind::Warning, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, MessageKind::Error, content)
    }

    pub fn welcome(content: impl Into<String>) -> Self {
        Self {
            pinned: true,
            ..Self::assistant(content)
        }
    }

    pub fn with_files(mut self, files: Vec<FileRef>) -> Self {
        self.files = files;
        self
    }

    fn new(role: ChatRole, kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            kind,
            files: Vec::new(),
            pinned: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcript that starts with a pinned welcome entry.
    pub fn with_welcome(text: impl Into<String>) -> Self {
        Self {
            entries: vec![ChatMessage::welcome(text)],
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.entries.push(message);
    }

    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.entries.last()
    }

    /// Remove every entry except a pinned first one.
    pub fn clear(&mut self) {
        let keep = usize::from(self.entries.first().is_some_and(|m| m.pinned));
        self.entries.truncate(keep);
    }

    /// Every file reference in transcript order.
    pub fn file_refs(&self) -> impl Iterator<Item = &FileRef> {
        self.entries.iter().flat_map(|m| m.files.iter())
    }
}
