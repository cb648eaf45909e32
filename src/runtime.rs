//! Runtime for driving a session
//!
//! Serializes every session mutation through one command queue and carries
//! out the effects the state machine asks for.

mod delay;
mod executor;

#[cfg(test)]
pub mod testing;

pub use delay::TypingDelay;
pub use executor::SessionRuntime;

use crate::backend::{AnalysisService, ReplyService};
use crate::session::{Event, Session, SessionUpdate};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

const COMMAND_BUFFER: usize = 32;
const UPDATE_BUFFER: usize = 64;

/// Messages accepted by the runtime loop
#[derive(Debug)]
pub enum Command {
    Dispatch(Event),
    Snapshot(oneshot::Sender<Session>),
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Session runtime has stopped")]
    Closed,
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<Command>,
    broadcast_tx: broadcast::Sender<SessionUpdate>,
}

impl SessionHandle {
    /// Submit user text. Blank text and submissions during an outstanding
    /// reply are dropped by the session.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Closed`] if the runtime has stopped.
    pub async fn submit(&self, text: impl Into<String>) -> Result<(), RuntimeError> {
        self.dispatch(Event::submit(text)).await
    }

    /// Request analysis of the conversation so far
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Closed`] if the runtime has stopped.
    pub async fn end_conversation(&self) -> Result<(), RuntimeError> {
        self.dispatch(Event::EndConversation).await
    }

    /// Hide the presented summary
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Closed`] if the runtime has stopped.
    pub async fn dismiss_summary(&self) -> Result<(), RuntimeError> {
        self.dispatch(Event::DismissSummary).await
    }

    /// Start over: clear the timeline and summary, and discard in-flight results
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Closed`] if the runtime has stopped.
    pub async fn reset(&self) -> Result<(), RuntimeError> {
        self.dispatch(Event::Reset).await
    }

    /// Copy of the session after every previously sent command has been applied
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Closed`] if the runtime has stopped.
    pub async fn snapshot(&self) -> Result<Session, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(Command::Snapshot(tx))
            .await
            .map_err(|_| RuntimeError::Closed)?;
        rx.await.map_err(|_| RuntimeError::Closed)
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.broadcast_tx.subscribe()
    }

    async fn dispatch(&self, event: Event) -> Result<(), RuntimeError> {
        self.command_tx
            .send(Command::Dispatch(event))
            .await
            .map_err(|_| RuntimeError::Closed)
    }
}

/// Spawn a runtime for a fresh session.
///
/// The runtime stops once every [`SessionHandle`] is dropped and no service
/// call is outstanding.
#[must_use = "dropping the handle stops the runtime"]
pub fn start<R, A>(
    reply_service: Arc<R>,
    analysis_service: Arc<A>,
    typing_delay: TypingDelay,
) -> (SessionHandle, JoinHandle<()>)
where
    R: ReplyService + 'static,
    A: AnalysisService + 'static,
{
    let session = Session::new(uuid::Uuid::new_v4().to_string());
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (broadcast_tx, _) = broadcast::channel(UPDATE_BUFFER);

    let runtime = SessionRuntime::new(
        session,
        reply_service,
        analysis_service,
        typing_delay,
        command_rx,
        command_tx.downgrade(),
        broadcast_tx.clone(),
    );
    let join = tokio::spawn(runtime.run());

    (
        SessionHandle {
            command_tx,
            broadcast_tx,
        },
        join,
    )
}
