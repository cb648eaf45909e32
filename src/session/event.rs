//! Events that drive the session

use super::turn::Sentiment;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserSubmit {
        text: String,
    },
    EndConversation,
    DismissSummary,
    Reset,

    // Service completions, tagged with the generation they were issued under
    ReplyResolved {
        generation: u64,
        outcome: ReplyOutcome,
    },
    AnalysisResolved {
        generation: u64,
        seq: u64,
        outcome: AnalysisOutcome,
    },
}

impl Event {
    #[must_use]
    pub fn submit(text: impl Into<String>) -> Self {
        Event::UserSubmit { text: text.into() }
    }
}

/// Generated reply from the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub sentiment: Sentiment,
}

impl Reply {
    #[must_use]
    pub fn new(text: impl Into<String>, sentiment: Sentiment) -> Self {
        Self {
            text: text.into(),
            sentiment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Success(Reply),
    /// Carries the transport error message for logging only
    Failure(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Success { summary: String },
    Failure(String),
}
