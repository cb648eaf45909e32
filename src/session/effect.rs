//! Effects produced by state transitions

use super::lifecycle::Lifecycle;
use super::turn::Turn;

/// Effects to be executed by the runtime after a transition
#[derive(Debug, Clone)]
pub enum Effect {
    /// Ask the reply service for an answer to `text`
    RequestReply { generation: u64, text: String },

    /// Send the history to the analysis service
    RequestAnalysis {
        generation: u64,
        seq: u64,
        history: Vec<Turn>,
    },

    /// Cancel every outstanding service call
    AbortInFlight,

    /// Notify the embedding shell
    Notify(SessionUpdate),
}

/// Changes broadcast to whoever renders the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    TurnAppended(Turn),
    LifecycleChanged(Lifecycle),
    SummaryChanged(String),
    Cleared,
}

impl Effect {
    #[must_use]
    pub fn turn_appended(turn: &Turn) -> Self {
        Effect::Notify(SessionUpdate::TurnAppended(turn.clone()))
    }

    #[must_use]
    pub fn lifecycle_changed(lifecycle: Lifecycle) -> Self {
        Effect::Notify(SessionUpdate::LifecycleChanged(lifecycle))
    }

    #[must_use]
    pub fn summary_changed(summary: &str) -> Self {
        Effect::Notify(SessionUpdate::SummaryChanged(summary.to_string()))
    }
}
