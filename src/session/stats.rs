//! Aggregate statistics appended to the analysis report

use super::turn::{Sentiment, Turn};
use std::fmt;

/// Per-sentiment counts over agent turns plus the total number of turns.
///
/// `total` counts every turn on the timeline, user turns included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentStats {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub total: usize,
}

impl SentimentStats {
    #[must_use]
    pub fn from_turns(turns: &[Turn]) -> Self {
        let mut stats = Self {
            total: turns.len(),
            ..Self::default()
        };
        for sentiment in turns
            .iter()
            .filter(|t| !t.is_user())
            .filter_map(|t| t.sentiment)
        {
            match sentiment {
                Sentiment::Positive => stats.positive += 1,
                Sentiment::Negative => stats.negative += 1,
                Sentiment::Neutral => stats.neutral += 1,
            }
        }
        stats
    }

    #[must_use]
    pub fn count(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
        }
    }
}

impl fmt::Display for SentimentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Conversation Statistics:")?;
        for sentiment in Sentiment::ALL {
            writeln!(f, "- {sentiment} messages: {}", self.count(sentiment))?;
        }
        write!(f, "- Total messages: {}", self.total)
    }
}

/// External narrative followed by the locally computed statistics block
#[must_use]
pub fn compose_report(summary: &str, stats: &SentimentStats) -> String {
    format!("{}\n\n{stats}", summary.trim_end())
}
