use anyhow::Result;
use clap::Parser;
use oncosimis_server::{router, AppState, DocumentStore, OllamaClient, ServerConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,oncosimis_server=debug,tower_http=info")),
        )
        .with_target(true)
        .init();

    let config = ServerConfig::parse();
    info!("Starting Oncosimis AI Assistant v{}", env!("CARGO_PKG_VERSION"));

    if !config.docs_dir.exists() {
        std::fs::create_dir_all(&config.docs_dir)?;
        warn!("Created SOPs directory: {}", config.docs_dir.display());
    }

    let documents = DocumentStore::load(&config.docs_dir);
    if documents.is_empty() {
        warn!("No documents loaded from {}", config.docs_dir.display());
    } else {
        info!("Loaded {} SOP documents", documents.len());
        for name in documents.names().iter().take(5) {
            info!("  {}", name);
        }
        if documents.len() > 5 {
            info!("  ... and {} more", documents.len() - 5);
        }
    }

    let context = config.load_context()?;
    let ollama = OllamaClient::new(&config.ollama_url, &config.model);

    // Startup checks only log; serving does not wait for Ollama.
    let probe = ollama.clone();
    tokio::spawn(async move { probe.probe().await });

    let state = AppState::new(ollama, documents, &context);
    let app = router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Backend running on http://{}", listener.local_addr()?);
    info!("SOPs directory: {}", config.docs_dir.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    info!("Shutting down Oncosimis AI Assistant...");
    Ok(())
}
