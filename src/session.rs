//! Conversation session state machine
//!
//! Implements the Elm Architecture pattern: events are applied to a
//! [`Session`] by a deterministic transition function that returns the
//! effects (service calls, notifications) for the runtime to carry out.

mod effect;
mod event;
mod lifecycle;
mod stats;
mod timeline;
pub(crate) mod transition;
mod turn;


pub use effect::{Effect, SessionUpdate};
pub use event::{AnalysisOutcome, Event, Reply, ReplyOutcome};
pub use lifecycle::{AnalysisPhase, Lifecycle, ReplyPhase};
pub use stats::{compose_report, SentimentStats};
pub use timeline::Timeline;
pub use transition::{transition, TransitionError, TransitionResult};
pub use turn::{Sender, Sentiment, Turn};

/// Agent text used when the reply service fails
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Summary shown while the analysis request is outstanding
pub const PENDING_SUMMARY: &str = "Analyzing conversation...";

/// Summary shown when the analysis service fails
pub const ANALYSIS_UNAVAILABLE: &str =
    "Error: Could not analyze conversation. Please make sure the backend server is running.";

/// Analysis request that may still resolve the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingAnalysis {
    seq: u64,
    /// Timeline length when the history was sent
    turn_count: usize,
}

/// Aggregate root for one conversation.
///
/// Sole owner of the timeline, lifecycle and summary. Mutated only through
/// [`transition`].
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    /// Bumped on every reset; results issued under an older generation are stale
    generation: u64,
    timeline: Timeline,
    lifecycle: Lifecycle,
    summary: String,
    analysis_seq: u64,
    pending_analysis: Option<PendingAnalysis>,
}

impl Session {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            generation: 0,
            timeline: Timeline::new(),
            lifecycle: Lifecycle::default(),
            summary: String::new(),
            analysis_seq: 0,
            pending_analysis: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        self.timeline.turns()
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }
}
