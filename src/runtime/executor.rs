//! Session runtime executor

use super::{Command, TypingDelay};
use crate::backend::{AnalysisService, ReplyService};
use crate::session::{
    transition, AnalysisOutcome, Effect, Event, ReplyOutcome, Session, SessionUpdate,
    TransitionError, Turn,
};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

/// Owns the session and applies every event to it, one at a time.
///
/// User commands and service completions share a single queue, so timeline
/// mutations never interleave even though service calls run concurrently.
pub struct SessionRuntime<R, A>
where
    R: ReplyService + 'static,
    A: AnalysisService + 'static,
{
    session: Session,
    reply_service: Arc<R>,
    analysis_service: Arc<A>,
    typing_delay: TypingDelay,
    command_rx: mpsc::Receiver<Command>,
    /// Weak so the loop ends once every handle and in-flight task is gone
    command_tx: mpsc::WeakSender<Command>,
    broadcast_tx: broadcast::Sender<SessionUpdate>,
    /// Cancels service calls issued since the last reset
    cancel_token: CancellationToken,
}

impl<R, A> SessionRuntime<R, A>
where
    R: ReplyService + 'static,
    A: AnalysisService + 'static,
{
    #[must_use]
    pub fn new(
        session: Session,
        reply_service: Arc<R>,
        analysis_service: Arc<A>,
        typing_delay: TypingDelay,
        command_rx: mpsc::Receiver<Command>,
        command_tx: mpsc::WeakSender<Command>,
        broadcast_tx: broadcast::Sender<SessionUpdate>,
    ) -> Self {
        Self {
            session,
            reply_service,
            analysis_service,
            typing_delay,
            command_rx,
            command_tx,
            broadcast_tx,
            cancel_token: CancellationToken::new(),
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.session.id(), "Starting session runtime");

        while let Some(command) = self.command_rx.recv().await {
            match command {
                Command::Dispatch(event) => self.process_event(event),
                Command::Snapshot(reply_tx) => {
                    let _ = reply_tx.send(self.session.clone());
                }
            }
        }

        self.cancel_token.cancel();
        tracing::info!(session_id = %self.session.id(), "Session runtime stopped");
    }

    fn process_event(&mut self, event: Event) {
        let result = match transition(&mut self.session, event) {
            Ok(r) => r,
            Err(e) => {
                self.log_rejection(&e);
                return;
            }
        };

        tracing::debug!(
            session_id = %self.session.id(),
            generation = self.session.generation(),
            lifecycle = %self.session.lifecycle(),
            turns = self.session.timeline().len(),
            "Session transitioned"
        );

        for effect in result.effects {
            self.execute_effect(effect);
        }
    }

    fn log_rejection(&self, error: &TransitionError) {
        match error {
            // Validation rejections are silent no-ops for the user
            e if e.is_validation() => {
                tracing::debug!(session_id = %self.session.id(), reason = %e, "Ignoring event");
            }
            TransitionError::StaleResult { generation } => {
                tracing::debug!(
                    session_id = %self.session.id(),
                    stale_generation = generation,
                    generation = self.session.generation(),
                    "Discarding result from before reset"
                );
            }
            e => {
                tracing::warn!(session_id = %self.session.id(), error = %e, "Rejected event");
            }
        }
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::RequestReply { generation, text } => {
                let Some(command_tx) = self.command_tx.upgrade() else {
                    return;
                };
                let service = self.reply_service.clone();
                let cancel = self.cancel_token.clone();
                let typing_delay = self.typing_delay;

                tokio::spawn(async move {
                    let outcome = tokio::select! {
                        biased;
                        () = cancel.cancelled() => {
                            tracing::debug!(generation, "Reply request cancelled");
                            return;
                        }
                        outcome = fetch_reply(service.as_ref(), &text, typing_delay) => outcome,
                    };
                    let _ = command_tx
                        .send(Command::Dispatch(Event::ReplyResolved {
                            generation,
                            outcome,
                        }))
                        .await;
                });
            }

            Effect::RequestAnalysis {
                generation,
                seq,
                history,
            } => {
                let Some(command_tx) = self.command_tx.upgrade() else {
                    return;
                };
                let service = self.analysis_service.clone();
                let cancel = self.cancel_token.clone();

                tokio::spawn(async move {
                    let outcome = tokio::select! {
                        biased;
                        () = cancel.cancelled() => {
                            tracing::debug!(generation, seq, "Analysis request cancelled");
                            return;
                        }
                        outcome = fetch_analysis(service.as_ref(), &history) => outcome,
                    };
                    let _ = command_tx
                        .send(Command::Dispatch(Event::AnalysisResolved {
                            generation,
                            seq,
                            outcome,
                        }))
                        .await;
                });
            }

            Effect::AbortInFlight => {
                self.cancel_token.cancel();
                self.cancel_token = CancellationToken::new();
            }

            Effect::Notify(update) => {
                // No subscribers is fine
                let _ = self.broadcast_tx.send(update);
            }
        }
    }
}

/// Call the reply service; on success hold the answer back for the typing delay.
async fn fetch_reply<R: ReplyService + ?Sized>(
    service: &R,
    text: &str,
    typing_delay: TypingDelay,
) -> ReplyOutcome {
    match service.generate(text).await {
        Ok(reply) => {
            let delay = typing_delay.sample();
            tokio::time::sleep(delay).await;
            ReplyOutcome::Success(reply)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Reply service failed, using fallback");
            ReplyOutcome::Failure(e.message)
        }
    }
}

async fn fetch_analysis<A: AnalysisService + ?Sized>(service: &A, history: &[Turn]) -> AnalysisOutcome {
    match service.summarize(history).await {
        Ok(summary) => AnalysisOutcome::Success { summary },
        Err(e) => {
            tracing::error!(error = %e, "Analysis service failed");
            AnalysisOutcome::Failure(e.message)
        }
    }
}
