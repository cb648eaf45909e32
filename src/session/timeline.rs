//! Ordered turn history with id allocation

use super::turn::{Sentiment, Turn};

const FIRST_ID: u64 = 1;

/// Append-only (until reset) sequence of turns.
///
/// Ids follow a fixed numbering: a user turn takes the next id and advances
/// the counter by one; the agent turn answering it skips one slot and
/// advances the counter by two. A round trip starting at id 1 therefore
/// yields ids 1 and 3, and the next user turn gets 4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    turns: Vec<Turn>,
    next_id: u64,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    #[must_use]
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            next_id: FIRST_ID,
        }
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Id the next user turn will receive
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn append_user(&mut self, text: impl Into<String>) -> &Turn {
        let turn = Turn::user(self.next_id, text);
        self.next_id += 1;
        self.push(turn)
    }

    pub fn append_agent(&mut self, text: impl Into<String>, sentiment: Sentiment) -> &Turn {
        let turn = Turn::agent(self.next_id + 1, text, sentiment);
        self.next_id += 2;
        self.push(turn)
    }

    /// Clear all turns and restart numbering at 1
    pub fn reset(&mut self) {
        self.turns.clear();
        self.next_id = FIRST_ID;
    }

    fn push(&mut self, turn: Turn) -> &Turn {
        self.turns.push(turn);
        let last = self.turns.len() - 1;
        &self.turns[last]
    }
}
