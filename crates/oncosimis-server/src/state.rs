use std::sync::Arc;

use crate::documents::DocumentStore;
use crate::ollama::OllamaClient;

/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub ollama: OllamaClient,
    pub documents: Arc<DocumentStore>,
    /// Company knowledge placed at the top of every prompt.
    pub context: Arc<str>,
}

impl AppState {
    pub fn new(ollama: OllamaClient, documents: DocumentStore, context: &str) -> Self {
        Self {
            ollama,
            documents: Arc::new(documents),
            context: Arc::from(context),
        }
    }
}
