//! Turn types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    /// `"bot"` on the wire, which is what the analysis backend expects
    #[serde(rename = "bot", alias = "agent")]
    Agent,
}

/// Sentiment label attached to agent turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    #[serde(alias = "positive")]
    Positive,
    #[serde(alias = "negative")]
    Negative,
    #[serde(alias = "neutral")]
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message on the timeline.
///
/// Turns appended through [`Timeline`](super::Timeline) follow the sentiment
/// rule: user turns never carry a sentiment and agent turns always do. The
/// fields are public, so a turn built or deserialized elsewhere may not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

impl Turn {
    pub(super) fn user(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::User,
            sentiment: None,
        }
    }

    pub(super) fn agent(id: u64, text: impl Into<String>, sentiment: Sentiment) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::Agent,
            sentiment: Some(sentiment),
        }
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}
