pub mod config;
pub mod documents;
pub mod error;
pub mod intent;
pub mod ollama;
pub mod prompt;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use documents::DocumentStore;
pub use ollama::OllamaClient;
pub use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/chat", post(routes::chat))
        .route("/documents", get(routes::documents))
        .route("/download/{filename}", get(routes::download))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
