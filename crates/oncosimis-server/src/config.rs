use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::prompt::DEFAULT_CONTEXT;

#[derive(Parser, Debug, Clone)]
#[command(name = "oncosimis-server")]
#[command(about = "Chat backend for the Oncosimis AI assistant", version)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "ONCOSIMIS_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "ONCOSIMIS_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Base URL of the Ollama server
    #[arg(long, env = "OLLAMA_BASE_URL", default_value = "http://localhost:11434")]
    pub ollama_url: String,

    /// Ollama model used for answers
    #[arg(short, long, env = "OLLAMA_MODEL", default_value = "llama2:7b")]
    pub model: String,

    /// Directory holding the SOP documents
    #[arg(long, env = "ONCOSIMIS_DOCS_DIR", default_value = "../SOPs-feed")]
    pub docs_dir: PathBuf,

    /// Text file replacing the built-in company knowledge
    #[arg(long, env = "ONCOSIMIS_CONTEXT_FILE")]
    pub context_file: Option<PathBuf>,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn load_context(&self) -> Result<String> {
        match &self.context_file {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("reading context file {}", path.display())),
            None => Ok(DEFAULT_CONTEXT.to_string()),
        }
    }
}
