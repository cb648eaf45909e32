//! Backend service abstraction
//!
//! The session talks to two opaque remote operations: reply generation for a
//! single user message and analysis of a whole conversation.

mod error;
mod http;
mod types;

pub use error::{TransportError, TransportErrorKind};
pub use http::HttpBackend;
pub use types::{AnalyzeRequest, AnalyzeResponse, ChatRequest, ChatResponse, HealthResponse};

use crate::session::{Reply, Turn};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Generates the agent's answer to one user message
#[async_trait]
pub trait ReplyService: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the backend cannot be reached or
    /// answers with something other than a reply.
    async fn generate(&self, text: &str) -> Result<Reply, TransportError>;
}

/// Summarizes a finished conversation
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the backend cannot be reached or
    /// answers without a summary.
    async fn summarize(&self, history: &[Turn]) -> Result<String, TransportError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: ReplyService + ?Sized> ReplyService for Arc<T> {
    async fn generate(&self, text: &str) -> Result<Reply, TransportError> {
        (**self).generate(text).await
    }
}

#[async_trait]
impl<T: AnalysisService + ?Sized> AnalysisService for Arc<T> {
    async fn summarize(&self, history: &[Turn]) -> Result<String, TransportError> {
        (**self).summarize(history).await
    }
}

/// Logging wrapper for backend services
pub struct LoggingBackend<B> {
    inner: B,
}

impl<B> LoggingBackend<B> {
    #[must_use]
    pub fn new(inner: B) -> Self {
        Self { inner }
    }

    fn log<T>(operation: &'static str, started: Instant, result: &Result<T, TransportError>) {
        let duration_ms = started.elapsed().as_millis();
        match result {
            Ok(_) => {
                tracing::info!(operation, duration_ms = %duration_ms, "Backend request completed");
            }
            Err(e) if e.kind.is_server_side() => {
                tracing::error!(
                    operation,
                    duration_ms = %duration_ms,
                    error = %e.message,
                    kind = ?e.kind,
                    "Backend request failed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    operation,
                    duration_ms = %duration_ms,
                    error = %e.message,
                    kind = ?e.kind,
                    "Backend request failed"
                );
            }
        }
    }
}

#[async_trait]
impl<B: ReplyService> ReplyService for LoggingBackend<B> {
    async fn generate(&self, text: &str) -> Result<Reply, TransportError> {
        let started = Instant::now();
        let result = self.inner.generate(text).await;
        Self::log("chat", started, &result);
        if let Ok(reply) = &result {
            tracing::debug!(sentiment = %reply.sentiment, "Reply classified");
        }
        result
    }
}

#[async_trait]
impl<B: AnalysisService> AnalysisService for LoggingBackend<B> {
    async fn summarize(&self, history: &[Turn]) -> Result<String, TransportError> {
        let started = Instant::now();
        let result = self.inner.summarize(history).await;
        Self::log("analyze", started, &result);
        result
    }
}
