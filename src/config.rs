//! Client configuration from the environment

use crate::runtime::TypingDelay;
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the backend lives and how the session paces itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub typing_delay: TypingDelay,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            typing_delay: TypingDelay::default(),
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Unparseable values fall back to defaults.
    #[must_use]
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let base_url = lookup("CHAT_BACKEND_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.base_url);

        let request_timeout = parse_u64(&lookup, "CHAT_REQUEST_TIMEOUT_SECS")
            .filter(|secs| *secs > 0)
            .map_or(defaults.request_timeout, Duration::from_secs);

        let min = parse_u64(&lookup, "CHAT_TYPING_DELAY_MIN_MS")
            .map_or(defaults.typing_delay.min, Duration::from_millis);
        let max = parse_u64(&lookup, "CHAT_TYPING_DELAY_MAX_MS")
            .map_or(defaults.typing_delay.max, Duration::from_millis);

        Self {
            base_url,
            request_timeout,
            typing_delay: TypingDelay::new(min, max),
        }
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable setting");
            None
        }
    }
}
