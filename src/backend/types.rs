//! Wire types for the backend's JSON API

use crate::session::{Reply, Sentiment, Turn};
use serde::{Deserialize, Serialize};

/// `POST /chat` request
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub text: &'a str,
}

/// `POST /chat` response
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub bot_text: String,
    pub sentiment: Sentiment,
}

impl From<ChatResponse> for Reply {
    fn from(resp: ChatResponse) -> Self {
        Reply::new(resp.bot_text, resp.sentiment)
    }
}

/// `POST /analyze` request
#[derive(Debug, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub history: &'a [Turn],
}

/// `POST /analyze` response
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub summary: String,
}

/// `GET /health` response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
