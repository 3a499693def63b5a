use anyhow::{anyhow, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ClientError;
use crate::protocol::{ChatReply, ChatRequest, HealthReport};

/// Header that stops tunnelling proxies (ngrok) from answering with an
/// interstitial HTML page instead of forwarding the request.
pub const SKIP_BROWSER_WARNING_HEADER: &str = "ngrok-skip-browser-warning";
pub const SKIP_BROWSER_WARNING_VALUE: &str = "69420";

/// HTTP client for the assistant backend.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_options(base_url, true)
    }

    pub fn with_options(base_url: &str, skip_browser_warning: bool) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| anyhow!("Invalid backend URL '{}': {}", base_url, e))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("Backend URL '{}' cannot carry a path", base_url));
        }

        let mut headers = HeaderMap::new();
        if skip_browser_warning {
            headers.insert(
                HeaderName::from_static(SKIP_BROWSER_WARNING_HEADER),
                HeaderValue::from_static(SKIP_BROWSER_WARNING_VALUE),
            );
        }

        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL; every segment is percent-escaped on its own.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn health(&self) -> Result<HealthReport, ClientError> {
        let response = self.get(&["health"]).await?;
        decode(response).await
    }

    pub async fn chat(&self, message: &str) -> Result<ChatReply, ClientError> {
        let url = self.endpoint(&["chat"]);
        debug!(%url, "sending chat message");

        let request = ChatRequest {
            message: message.to_string(),
        };

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        decode(check_status(response)?).await
    }

    /// Fetch a document. The whole body is read before returning.
    pub async fn download(&self, filename: &str) -> Result<Vec<u8>, ClientError> {
        let response = self.get(&["download", filename]).await?;
        let bytes = response.bytes().await.map_err(ClientError::Transport)?;
        Ok(bytes.to_vec())
    }

    async fn get(&self, segments: &[&str]) -> Result<Response, ClientError> {
        let url = self.endpoint(segments);
        debug!(%url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        check_status(response)
    }
}

fn check_status(response: Response) -> Result<Response, ClientError> {
    if !response.status().is_success() {
        return Err(ClientError::Status(response.status()));
    }
    Ok(response)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    response.json().await.map_err(ClientError::Decode)
}
