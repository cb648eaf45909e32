//! Session lifecycle states
//!
//! Two orthogonal phases: the reply loop and the analysis loop. Either can
//! be busy independently of the other.

use std::fmt;

/// Reply loop: at most one reply request in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyPhase {
    #[default]
    Idle,
    AwaitingReply,
}

/// Analysis loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisPhase {
    #[default]
    Idle,
    AwaitingAnalysis,
    /// A report (or the unavailable message) is on screen until dismissed or reset
    SummaryPresented,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Lifecycle {
    pub reply: ReplyPhase,
    pub analysis: AnalysisPhase,
}

impl Lifecycle {
    #[must_use]
    pub fn is_awaiting_reply(&self) -> bool {
        self.reply == ReplyPhase::AwaitingReply
    }

    #[must_use]
    pub fn is_awaiting_analysis(&self) -> bool {
        self.analysis == AnalysisPhase::AwaitingAnalysis
    }

    /// True when no service call is outstanding
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !self.is_awaiting_reply() && !self.is_awaiting_analysis()
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reply = match self.reply {
            ReplyPhase::Idle => "idle",
            ReplyPhase::AwaitingReply => "awaiting_reply",
        };
        let analysis = match self.analysis {
            AnalysisPhase::Idle => "idle",
            AnalysisPhase::AwaitingAnalysis => "awaiting_analysis",
            AnalysisPhase::SummaryPresented => "summary_presented",
        };
        write!(f, "reply={reply} analysis={analysis}")
    }
}
