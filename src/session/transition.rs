//! Session transition function
//!
//! Deterministic and free of I/O: given the same session and event it always
//! makes the same change and returns the same effects. A rejected event
//! leaves the session exactly as it was.

use super::stats::{compose_report, SentimentStats};
use super::{
    AnalysisOutcome, AnalysisPhase, Effect, Event, PendingAnalysis, ReplyOutcome, ReplyPhase,
    Session, SessionUpdate, Sentiment, ANALYSIS_UNAVAILABLE, FALLBACK_REPLY, PENDING_SUMMARY,
};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug, Default)]
pub struct TransitionResult {
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Reasons an event is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyInput,
    #[error("A reply is already in flight")]
    ReplyInFlight,
    #[error("Nothing to analyze yet")]
    EmptyTimeline,
    #[error("No summary is being presented")]
    NoSummaryPresented,
    #[error("Discarding stale result from generation {generation}")]
    StaleResult { generation: u64 },
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

impl TransitionError {
    /// Validation rejections are dropped at the UI boundary without a message
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput | Self::ReplyInFlight | Self::EmptyTimeline | Self::NoSummaryPresented
        )
    }
}

/// Apply `event` to `session`.
///
/// # Errors
///
/// Returns a [`TransitionError`] when the event is not valid in the current
/// state. The session is left unchanged in that case.
pub fn transition(session: &mut Session, event: Event) -> Result<TransitionResult, TransitionError> {
    match event {
        Event::UserSubmit { text } => submit(session, text),
        Event::ReplyResolved {
            generation,
            outcome,
        } => resolve_reply(session, generation, outcome),
        Event::EndConversation => end_conversation(session),
        Event::AnalysisResolved {
            generation,
            seq,
            outcome,
        } => resolve_analysis(session, generation, seq, outcome),
        Event::DismissSummary => dismiss_summary(session),
        Event::Reset => Ok(reset(session)),
    }
}

// ============================================================
// Reply loop
// ============================================================

fn submit(session: &mut Session, text: String) -> Result<TransitionResult, TransitionError> {
    if text.trim().is_empty() {
        return Err(TransitionError::EmptyInput);
    }
    if session.lifecycle.is_awaiting_reply() {
        return Err(TransitionError::ReplyInFlight);
    }

    let turn = session.timeline.append_user(text.clone()).clone();
    session.lifecycle.reply = ReplyPhase::AwaitingReply;

    Ok(TransitionResult::new()
        .with_effect(Effect::turn_appended(&turn))
        .with_effect(Effect::lifecycle_changed(session.lifecycle))
        .with_effect(Effect::RequestReply {
            generation: session.generation,
            text,
        }))
}

fn resolve_reply(
    session: &mut Session,
    generation: u64,
    outcome: ReplyOutcome,
) -> Result<TransitionResult, TransitionError> {
    if generation != session.generation {
        return Err(TransitionError::StaleResult { generation });
    }
    if !session.lifecycle.is_awaiting_reply() {
        return Err(TransitionError::InvalidTransition(
            "reply resolved while no reply was requested".to_string(),
        ));
    }

    let turn = match outcome {
        ReplyOutcome::Success(reply) => session
            .timeline
            .append_agent(reply.text, reply.sentiment)
            .clone(),
        ReplyOutcome::Failure(_) => session
            .timeline
            .append_agent(FALLBACK_REPLY, Sentiment::Neutral)
            .clone(),
    };
    session.lifecycle.reply = ReplyPhase::Idle;

    Ok(TransitionResult::new()
        .with_effect(Effect::turn_appended(&turn))
        .with_effect(Effect::lifecycle_changed(session.lifecycle)))
}

// ============================================================
// Analysis loop
// ============================================================

fn end_conversation(session: &mut Session) -> Result<TransitionResult, TransitionError> {
    if session.timeline.is_empty() {
        return Err(TransitionError::EmptyTimeline);
    }

    session.analysis_seq += 1;
    let seq = session.analysis_seq;
    session.pending_analysis = Some(PendingAnalysis {
        seq,
        turn_count: session.timeline.len(),
    });
    session.lifecycle.analysis = AnalysisPhase::AwaitingAnalysis;
    session.summary = PENDING_SUMMARY.to_string();

    Ok(TransitionResult::new()
        .with_effect(Effect::lifecycle_changed(session.lifecycle))
        .with_effect(Effect::summary_changed(&session.summary))
        .with_effect(Effect::RequestAnalysis {
            generation: session.generation,
            seq,
            history: session.timeline.turns().to_vec(),
        }))
}

fn resolve_analysis(
    session: &mut Session,
    generation: u64,
    seq: u64,
    outcome: AnalysisOutcome,
) -> Result<TransitionResult, TransitionError> {
    if generation != session.generation {
        return Err(TransitionError::StaleResult { generation });
    }
    // Only the most recent analysis may settle the loop
    let pending = match session.pending_analysis {
        Some(pending) if pending.seq == seq => pending,
        Some(_) => return Err(TransitionError::StaleResult { generation }),
        None => {
            return Err(TransitionError::InvalidTransition(
                "analysis resolved while none was requested".to_string(),
            ))
        }
    };

    session.summary = match outcome {
        AnalysisOutcome::Success { summary } => {
            let turns = session.timeline.turns();
            let analyzed = &turns[..pending.turn_count.min(turns.len())];
            compose_report(&summary, &SentimentStats::from_turns(analyzed))
        }
        AnalysisOutcome::Failure(_) => ANALYSIS_UNAVAILABLE.to_string(),
    };
    session.pending_analysis = None;
    session.lifecycle.analysis = AnalysisPhase::SummaryPresented;

    Ok(TransitionResult::new()
        .with_effect(Effect::summary_changed(&session.summary))
        .with_effect(Effect::lifecycle_changed(session.lifecycle)))
}

fn dismiss_summary(session: &mut Session) -> Result<TransitionResult, TransitionError> {
    if session.lifecycle.analysis != AnalysisPhase::SummaryPresented {
        return Err(TransitionError::NoSummaryPresented);
    }
    session.lifecycle.analysis = AnalysisPhase::Idle;
    Ok(TransitionResult::new().with_effect(Effect::lifecycle_changed(session.lifecycle)))
}

// ============================================================
// Reset
// ============================================================

fn reset(session: &mut Session) -> TransitionResult {
    session.generation += 1;
    session.timeline.reset();
    session.lifecycle = super::Lifecycle::default();
    session.summary.clear();
    session.pending_analysis = None;

    TransitionResult::new()
        .with_effect(Effect::AbortInFlight)
        .with_effect(Effect::Notify(SessionUpdate::Cleared))
        .with_effect(Effect::lifecycle_changed(session.lifecycle))
}
