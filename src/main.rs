//! Terminal shell for a chat session
//!
//! Every input line is sent as a user message. Commands:
//! `/end` analyzes the conversation, `/close` dismisses the report,
//! `/new` starts over, `/quit` exits.

use chat_session::backend::{HttpBackend, LoggingBackend};
use chat_session::config::ClientConfig;
use chat_session::runtime;
use chat_session::session::{SessionUpdate, PENDING_SUMMARY};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so the transcript on stdout stays readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_session=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(base_url = %config.base_url, "Using chat backend");

    let http = HttpBackend::new(&config)?;
    match http.health().await {
        Ok(true) => tracing::info!("Backend is healthy"),
        Ok(false) => tracing::warn!("Backend reports unhealthy status"),
        Err(e) => tracing::warn!(error = %e, "Backend unreachable, replies will fall back"),
    }

    let backend = Arc::new(LoggingBackend::new(http));
    let (handle, runtime) = runtime::start(backend.clone(), backend, config.typing_delay);
    let renderer = tokio::spawn(render(handle.subscribe()));

    println!("Start a conversation! (/end to analyze, /new to start over, /quit to exit)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" | "/exit" => break,
            "/end" => handle.end_conversation().await?,
            "/close" => handle.dismiss_summary().await?,
            "/new" => handle.reset().await?,
            _ => handle.submit(line).await?,
        }
    }

    runtime.abort();
    renderer.abort();
    Ok(())
}

async fn render(mut updates: broadcast::Receiver<SessionUpdate>) {
    loop {
        match updates.recv().await {
            Ok(SessionUpdate::TurnAppended(turn)) if !turn.is_user() => {
                match turn.sentiment {
                    Some(sentiment) => println!("Agent [{sentiment}]: {}", turn.text),
                    None => println!("Agent: {}", turn.text),
                }
            }
            Ok(SessionUpdate::LifecycleChanged(lifecycle)) if lifecycle.is_awaiting_reply() => {
                println!("Typing...");
            }
            Ok(SessionUpdate::SummaryChanged(summary)) if summary == PENDING_SUMMARY => {
                println!("{summary}");
            }
            Ok(SessionUpdate::SummaryChanged(summary)) => {
                println!("\n=== Conversation Analysis ===\n{summary}\n");
                println!("(/close to dismiss, /new for a new conversation)");
            }
            Ok(SessionUpdate::Cleared) => println!("--- New conversation ---"),
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Renderer fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
