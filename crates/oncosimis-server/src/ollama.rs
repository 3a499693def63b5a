use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

const RUNNING_BANNER: &str = "Ollama is running";

pub const FALLBACK_EMPTY: &str = "Sorry, I couldn't generate a response.";
pub const FALLBACK_STATUS: &str = "I'm having trouble connecting to the AI model. Please try again.";
pub const FALLBACK_TIMEOUT: &str = "The request took too long. Please try a simpler question.";
pub const FALLBACK_OTHER: &str = "An error occurred while processing your request.";

#[derive(Debug, Error)]
pub enum OllamaError {
    #[error("Ollama request timed out")]
    Timeout,

    #[error("Ollama request failed with status: {0}")]
    Status(StatusCode),

    #[error("Ollama request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unexpected Ollama response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl From<reqwest::Error> for OllamaError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            OllamaError::Timeout
        } else if e.is_decode() {
            OllamaError::Decode(e)
        } else {
            OllamaError::Transport(e)
        }
    }
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

/// Sampling settings sent with every chat completion.
#[derive(Serialize, Debug, Clone, Copy)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

const CHAT_OPTIONS: GenerateOptions = GenerateOptions {
    temperature: 0.7,
    top_p: 0.9,
    num_predict: 150,
};

#[derive(Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

#[derive(Deserialize)]
struct OllamaModelsResponse {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    request_timeout: Duration,
    probe_timeout: Duration,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            request_timeout: Duration::from_secs(60),
            probe_timeout: Duration::from_secs(3),
        }
    }

    pub fn with_timeouts(mut self, request: Duration, probe: Duration) -> Self {
        self.request_timeout = request;
        self.probe_timeout = probe;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn query(&self, prompt: &str) -> Result<String, OllamaError> {
        self.generate(prompt, Some(CHAT_OPTIONS), self.request_timeout).await
    }

    async fn generate(
        &self,
        prompt: &str,
        options: Option<GenerateOptions>,
        timeout: Duration,
    ) -> Result<String, OllamaError> {
        let url = format!("{}/api/generate", self.base_url);

        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            options,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OllamaError::Status(response.status()));
        }

        let ollama_response: OllamaResponse = response.json().await?;
        Ok(ollama_response.response.trim().to_string())
    }

    /// Ask the model and always come back with text the user can read.
    pub async fn answer(&self, prompt: &str) -> String {
        match self.query(prompt).await {
            Ok(text) if text.is_empty() => FALLBACK_EMPTY.to_string(),
            Ok(text) => text,
            Err(e) => {
                error!("Error querying Ollama: {}", e);
                match e {
                    OllamaError::Status(_) => FALLBACK_STATUS,
                    OllamaError::Timeout => FALLBACK_TIMEOUT,
                    OllamaError::Transport(_) | OllamaError::Decode(_) => FALLBACK_OTHER,
                }
                .to_string()
            }
        }
    }

    /// True when the Ollama root answers with its "is running" banner.
    pub async fn is_running(&self) -> bool {
        let url = format!("{}/", self.base_url);
        let response = match self.client.get(&url).timeout(self.probe_timeout).send().await {
            Ok(response) if response.status().is_success() => response,
            _ => return false,
        };
        response
            .text()
            .await
            .map(|body| body.contains(RUNNING_BANNER))
            .unwrap_or(false)
    }

    pub async fn list_models(&self) -> Result<Vec<String>, OllamaError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(self.probe_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OllamaError::Status(response.status()));
        }

        let models_response: OllamaModelsResponse = response.json().await?;
        let model_names: Vec<String> = models_response
            .models
            .into_iter()
            .map(|model| model.name)
            .collect();

        Ok(model_names)
    }

    /// Whether the configured model shows up in `/api/tags`. Tags such as
    /// `llama2:7b-q4` count as a match for `llama2:7b`.
    pub async fn has_model(&self) -> Result<bool, OllamaError> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|m| m.contains(&self.model)))
    }

    /// Log whether Ollama is up, has the model, and can generate.
    pub async fn probe(&self) {
        if !self.is_running().await {
            error!("Cannot connect to Ollama at {}", self.base_url);
            error!("Please ensure 'ollama serve' is running");
            return;
        }
        info!("Ollama server is running");

        match self.has_model().await {
            Ok(true) => info!("Model '{}' is available", self.model),
            Ok(false) => {
                error!("Model '{}' not found. Run: ollama pull {}", self.model, self.model);
                return;
            }
            Err(e) => {
                error!("Error checking models: {}", e);
                return;
            }
        }

        match self.generate("hi", None, Duration::from_secs(15)).await {
            Ok(_) => info!("Ollama connected successfully with model: {}", self.model),
            Err(e) => warn!("Model test failed: {}", e),
        }
    }
}
