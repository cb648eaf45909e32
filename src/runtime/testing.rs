//! Mock implementations for testing
//!
//! These mocks enable runtime tests without a real backend.

use super::{start, SessionHandle, TypingDelay};
use crate::backend::{AnalysisService, ReplyService, TransportError};
use crate::session::{Reply, SessionUpdate, Turn};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;

// ============================================================================
// Mock Backend
// ============================================================================

/// Mock backend that returns queued outcomes
pub struct MockBackend {
    replies: Mutex<VecDeque<Result<Reply, TransportError>>>,
    summaries: Mutex<VecDeque<Result<String, TransportError>>>,
    /// Latency applied to every call before answering
    latency: Duration,
    /// Record of all reply prompts
    pub prompts: Mutex<Vec<String>>,
    /// Record of all analyzed histories
    pub histories: Mutex<Vec<Vec<Turn>>>,
    /// Notified when a call starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_latency(Duration::ZERO)
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            summaries: Mutex::new(VecDeque::new()),
            latency,
            prompts: Mutex::new(Vec::new()),
            histories: Mutex::new(Vec::new()),
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_reply(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(Ok(reply));
    }

    pub fn queue_reply_error(&self, error: TransportError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn queue_summary(&self, summary: impl Into<String>) {
        self.summaries.lock().unwrap().push_back(Ok(summary.into()));
    }

    pub fn queue_summary_error(&self, error: TransportError) {
        self.summaries.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn recorded_histories(&self) -> Vec<Vec<Turn>> {
        self.histories.lock().unwrap().clone()
    }

    async fn pause(&self) {
        self.request_started.notify_one();
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReplyService for MockBackend {
    async fn generate(&self, text: &str) -> Result<Reply, TransportError> {
        self.prompts.lock().unwrap().push(text.to_string());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::network("No mock reply queued")));
        self.pause().await;
        reply
    }
}

#[async_trait]
impl AnalysisService for MockBackend {
    async fn summarize(&self, history: &[Turn]) -> Result<String, TransportError> {
        self.histories.lock().unwrap().push(history.to_vec());
        let summary = self
            .summaries
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::network("No mock summary queued")));
        self.pause().await;
        summary
    }
}

// ============================================================================
// Test Runtime
// ============================================================================

/// Builder for a runtime wired to a [`MockBackend`]
pub struct TestRuntimeBuilder {
    backend: MockBackend,
    typing_delay: TypingDelay,
}

impl TestRuntimeBuilder {
    pub fn backend(mut self, backend: MockBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn typing_delay(mut self, typing_delay: TypingDelay) -> Self {
        self.typing_delay = typing_delay;
        self
    }

    pub fn build(self) -> TestRuntime {
        let backend = Arc::new(self.backend);
        let (handle, join) = start(backend.clone(), backend.clone(), self.typing_delay);
        let updates = handle.subscribe();
        TestRuntime {
            handle,
            updates,
            backend,
            join,
        }
    }
}

pub struct TestRuntime {
    pub handle: SessionHandle,
    pub updates: broadcast::Receiver<SessionUpdate>,
    pub backend: Arc<MockBackend>,
    pub join: JoinHandle<()>,
}

impl TestRuntime {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> TestRuntimeBuilder {
        TestRuntimeBuilder {
            backend: MockBackend::new(),
            typing_delay: TypingDelay::none(),
        }
    }

    /// Wait for an update matching `pred`, skipping others
    pub async fn wait_for(
        &mut self,
        timeout: Duration,
        pred: impl Fn(&SessionUpdate) -> bool,
    ) -> Option<SessionUpdate> {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            match tokio::time::timeout(Duration::from_millis(50), self.updates.recv()).await {
                Ok(Ok(update)) if pred(&update) => return Some(update),
                _ => continue,
            }
        }
        None
    }

    /// Wait until the reply loop goes back to idle
    pub async fn wait_for_reply_done(&mut self, timeout: Duration) -> bool {
        self.wait_for(timeout, |u| {
            matches!(u, SessionUpdate::LifecycleChanged(l) if !l.is_awaiting_reply())
        })
        .await
        .is_some()
    }

    /// Wait until an analysis report (or the error text) is presented
    pub async fn wait_for_summary(&mut self, timeout: Duration) -> Option<String> {
        match self
            .wait_for(timeout, |u| {
                matches!(u, SessionUpdate::SummaryChanged(s) if s != crate::session::PENDING_SUMMARY)
            })
            .await
        {
            Some(SessionUpdate::SummaryChanged(summary)) => Some(summary),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{
        AnalysisPhase, Lifecycle, Sender, Sentiment, ANALYSIS_UNAVAILABLE, FALLBACK_REPLY,
        PENDING_SUMMARY,
    };
    use std::time::Instant;

    const WAIT: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn test_mock_backend() {
        let mock = MockBackend::new();
        mock.queue_reply(Reply::new("Hello", Sentiment::Positive));

        let reply = mock.generate("Hi").await.unwrap();
        assert_eq!(reply.text, "Hello");
        assert_eq!(mock.recorded_prompts(), vec!["Hi".to_string()]);

        // Second call should fail (no more replies)
        assert!(mock.generate("Hi").await.is_err());
        assert!(mock.summarize(&[]).await.is_err());
    }

    /// Submit "Hello" and get the canonical two-turn timeline
    #[tokio::test]
    async fn test_hello_round_trip() {
        let backend = MockBackend::new();
        backend.queue_reply(Reply::new("Hi there!", Sentiment::Positive));

        let mut rt = TestRuntime::new().backend(backend).build();
        rt.handle.submit("Hello").await.unwrap();
        assert!(rt.wait_for_reply_done(WAIT).await);

        let session = rt.handle.snapshot().await.unwrap();
        let turns = session.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!((turns[0].id, turns[0].sender, turns[0].sentiment), (1, Sender::User, None));
        assert_eq!(turns[0].text, "Hello");
        assert_eq!(
            (turns[1].id, turns[1].sender, turns[1].sentiment),
            (3, Sender::Agent, Some(Sentiment::Positive))
        );
        assert_eq!(turns[1].text, "Hi there!");
        assert_eq!(session.lifecycle(), Lifecycle::default());
    }

    #[tokio::test]
    async fn test_reply_failure_uses_fallback() {
        let backend = MockBackend::new();
        backend.queue_reply_error(TransportError::network("Connection refused"));

        let mut rt = TestRuntime::new().backend(backend).build();
        rt.handle.submit("Hello").await.unwrap();
        assert!(rt.wait_for_reply_done(WAIT).await);

        let session = rt.handle.snapshot().await.unwrap();
        let agent = &session.turns()[1];
        assert_eq!(agent.text, FALLBACK_REPLY);
        assert_eq!(agent.sentiment, Some(Sentiment::Neutral));
        assert!(!session.lifecycle().is_awaiting_reply());
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let rt = TestRuntime::new().build();
        rt.handle.submit("   ").await.unwrap();
        rt.handle.submit("").await.unwrap();

        let session = rt.handle.snapshot().await.unwrap();
        assert!(session.timeline().is_empty());
        assert_eq!(session.timeline().next_id(), 1);
        assert!(rt.backend.recorded_prompts().is_empty());
    }

    #[tokio::test]
    async fn test_second_submit_while_awaiting_is_dropped() {
        let backend = MockBackend::with_latency(Duration::from_millis(200));
        backend.queue_reply(Reply::new("first answer", Sentiment::Neutral));
        backend.queue_reply(Reply::new("should not be used", Sentiment::Neutral));

        let mut rt = TestRuntime::new().backend(backend).build();
        rt.handle.submit("first").await.unwrap();
        rt.handle.submit("second").await.unwrap();

        let session = rt.handle.snapshot().await.unwrap();
        assert_eq!(session.timeline().len(), 1);
        assert!(session.lifecycle().is_awaiting_reply());

        assert!(rt.wait_for_reply_done(WAIT).await);
        let session = rt.handle.snapshot().await.unwrap();
        assert_eq!(session.timeline().len(), 2);
        assert_eq!(rt.backend.recorded_prompts(), vec!["first".to_string()]);
    }

    #[tokio::test]
    async fn test_typing_delay_applies_to_successful_replies() {
        let backend = MockBackend::new();
        backend.queue_reply(Reply::new("hi", Sentiment::Positive));

        let mut rt = TestRuntime::new()
            .backend(backend)
            .typing_delay(TypingDelay::new(
                Duration::from_millis(150),
                Duration::from_millis(151),
            ))
            .build();

        let started = Instant::now();
        rt.handle.submit("Hello").await.unwrap();
        assert!(rt.wait_for_reply_done(WAIT).await);
        assert!(started.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_failed_reply_skips_typing_delay() {
        let backend = MockBackend::new();
        backend.queue_reply_error(TransportError::network("down"));

        let mut rt = TestRuntime::new()
            .backend(backend)
            .typing_delay(TypingDelay::new(
                Duration::from_secs(10),
                Duration::from_secs(11),
            ))
            .build();

        rt.handle.submit("Hello").await.unwrap();
        assert!(rt.wait_for_reply_done(WAIT).await);
    }

    #[tokio::test]
    async fn test_analysis_report_includes_stats() {
        let backend = MockBackend::new();
        backend.queue_reply(Reply::new("Great!", Sentiment::Positive));
        backend.queue_reply(Reply::new("Oh no.", Sentiment::Negative));
        backend.queue_summary("The user went from happy to upset.");

        let mut rt = TestRuntime::new().backend(backend).build();
        rt.handle.submit("I got the job").await.unwrap();
        assert!(rt.wait_for_reply_done(WAIT).await);
        rt.handle.submit("But it is far away").await.unwrap();
        assert!(rt.wait_for_reply_done(WAIT).await);

        rt.handle.end_conversation().await.unwrap();
        let summary = rt.wait_for_summary(WAIT).await.expect("summary");

        assert!(summary.starts_with("The user went from happy to upset."));
        assert!(summary.contains("- Positive messages: 1"));
        assert!(summary.contains("- Negative messages: 1"));
        assert!(summary.contains("- Neutral messages: 0"));
        assert!(summary.contains("- Total messages: 4"));

        let histories = rt.backend.recorded_histories();
        assert_eq!(histories.len(), 1);
        assert_eq!(histories[0].len(), 4);

        let session = rt.handle.snapshot().await.unwrap();
        assert_eq!(session.summary(), summary);
        assert_eq!(session.lifecycle().analysis, AnalysisPhase::SummaryPresented);
    }

    #[tokio::test]
    async fn test_pending_summary_shown_while_analyzing() {
        let backend = MockBackend::with_latency(Duration::from_millis(100));
        backend.queue_reply(Reply::new("ok", Sentiment::Neutral));
        backend.queue_summary("fine");

        let mut rt = TestRuntime::new().backend(backend).build();
        rt.handle.submit("hey").await.unwrap();
        assert!(rt.wait_for_reply_done(WAIT).await);
        rt.handle.end_conversation().await.unwrap();

        let session = rt.handle.snapshot().await.unwrap();
        assert_eq!(session.summary(), PENDING_SUMMARY);
        assert!(session.lifecycle().is_awaiting_analysis());

        assert!(rt.wait_for_summary(WAIT).await.is_some());
    }

    #[tokio::test]
    async fn test_analysis_failure_reports_unavailable() {
        let backend = MockBackend::new();
        backend.queue_reply(Reply::new("ok", Sentiment::Neutral));
        backend.queue_summary_error(TransportError::status(503, "unavailable"));

        let mut rt = TestRuntime::new().backend(backend).build();
        rt.handle.submit("hey").await.unwrap();
        assert!(rt.wait_for_reply_done(WAIT).await);
        let before = rt.handle.snapshot().await.unwrap();

        rt.handle.end_conversation().await.unwrap();
        let summary = rt.wait_for_summary(WAIT).await.expect("summary");
        assert_eq!(summary, ANALYSIS_UNAVAILABLE);

        let after = rt.handle.snapshot().await.unwrap();
        assert_eq!(after.turns(), before.turns());
    }

    #[tokio::test]
    async fn test_dismiss_then_new_conversation() {
        let backend = MockBackend::new();
        backend.queue_reply(Reply::new("ok", Sentiment::Neutral));
        backend.queue_summary("fine");

        let mut rt = TestRuntime::new().backend(backend).build();
        rt.handle.submit("hey").await.unwrap();
        assert!(rt.wait_for_reply_done(WAIT).await);
        rt.handle.end_conversation().await.unwrap();
        assert!(rt.wait_for_summary(WAIT).await.is_some());

        rt.handle.dismiss_summary().await.unwrap();
        let session = rt.handle.snapshot().await.unwrap();
        assert_eq!(session.lifecycle().analysis, AnalysisPhase::Idle);
        assert!(session.summary().starts_with("fine"));

        rt.handle.reset().await.unwrap();
        let session = rt.handle.snapshot().await.unwrap();
        assert!(session.timeline().is_empty());
        assert_eq!(session.summary(), "");
    }

    /// A reply that arrives after a reset must not revive the old timeline
    #[tokio::test]
    async fn test_reset_discards_in_flight_reply() {
        let backend = MockBackend::with_latency(Duration::from_millis(300));
        backend.queue_reply(Reply::new("too late", Sentiment::Positive));
        let started = backend.request_started.clone();

        let mut rt = TestRuntime::new().backend(backend).build();
        rt.handle.submit("Hello").await.unwrap();
        started.notified().await;

        rt.handle.reset().await.unwrap();
        assert!(rt
            .wait_for(WAIT, |u| matches!(u, SessionUpdate::Cleared))
            .await
            .is_some());

        tokio::time::sleep(Duration::from_millis(500)).await;
        let session = rt.handle.snapshot().await.unwrap();
        assert!(session.timeline().is_empty());
        assert_eq!(session.timeline().next_id(), 1);
        assert_eq!(session.lifecycle(), Lifecycle::default());
        assert_eq!(session.generation(), 1);
    }

    #[tokio::test]
    async fn test_submit_after_reset_works() {
        let backend = MockBackend::with_latency(Duration::from_millis(200));
        // Whether the first call consumes a reply depends on when the reset lands
        backend.queue_reply(Reply::new("answer", Sentiment::Negative));
        backend.queue_reply(Reply::new("answer", Sentiment::Negative));

        let mut rt = TestRuntime::new().backend(backend).build();
        rt.handle.submit("old").await.unwrap();
        rt.handle.reset().await.unwrap();
        rt.handle.submit("new").await.unwrap();

        assert!(rt
            .wait_for(WAIT, |u| matches!(
                u,
                SessionUpdate::TurnAppended(t) if t.sender == Sender::Agent
            ))
            .await
            .is_some());

        let session = rt.handle.snapshot().await.unwrap();
        let texts: Vec<&str> = session.turns().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(session.turns()[0].id, 1);
        assert_eq!(session.turns()[1].id, 3);
        assert_eq!(texts, vec!["new", "answer"]);
    }

    #[tokio::test]
    async fn test_runtime_stops_when_handles_dropped() {
        let rt = TestRuntime::new().build();
        let TestRuntime { handle, join, .. } = rt;
        drop(handle);

        tokio::time::timeout(WAIT, join)
            .await
            .expect("runtime should stop")
            .unwrap();
    }
}
