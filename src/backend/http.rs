//! HTTP implementation of the backend services

use super::types::{AnalyzeRequest, AnalyzeResponse, ChatRequest, ChatResponse, HealthResponse};
use super::{AnalysisService, ReplyService, TransportError};
use crate::config::ClientConfig;
use crate::session::{Reply, Turn};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const CHAT_PATH: &str = "/chat";
pub const ANALYZE_PATH: &str = "/analyze";
pub const HEALTH_PATH: &str = "/health";

/// JSON-over-HTTP client for the chat backend
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Fails if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Probe `GET /health`
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the backend is unreachable or the
    /// response is not a health report.
    pub async fn health(&self) -> Result<bool, TransportError> {
        let response = self.client.get(self.url(HEALTH_PATH)).send().await?;
        let health: HealthResponse = Self::read_json(response).await?;
        Ok(health.is_healthy())
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, TransportError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::read_json(response).await
    }

    async fn read_json<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, TransportError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(TransportError::status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            TransportError::decode(format!("Failed to parse response: {e} - body: {body}"))
        })
    }
}

#[async_trait]
impl ReplyService for HttpBackend {
    async fn generate(&self, text: &str) -> Result<Reply, TransportError> {
        let response: ChatResponse = self.post_json(CHAT_PATH, &ChatRequest { text }).await?;
        Ok(response.into())
    }
}

#[async_trait]
impl AnalysisService for HttpBackend {
    async fn summarize(&self, history: &[Turn]) -> Result<String, TransportError> {
        let response: AnalyzeResponse = self
            .post_json(ANALYZE_PATH, &AnalyzeRequest { history })
            .await?;
        Ok(response.summary)
    }
}
