//! Conversation Ledger
//!
//! Ordered, append-only record of every prompt/response exchange in a
//! session. Nothing in the baseline workflows consults it, but it is the
//! single place history accumulates, so context-window construction can be
//! layered on later without touching the workflows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who a conversation turn belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Prompt text this program constructed
    System,
    /// Text the model produced
    Assistant,
    /// Text typed by an interactive user
    Human,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::System => "system",
            Role::Assistant => "assistant",
            Role::Human => "human",
        };
        write!(f, "{name}")
    }
}

/// One immutable entry of the ledger
#[derive(Debug, Clone, Serialize)]
pub struct ConversationTurn {
    /// Position in the ledger, starting at 0
    pub index: usize,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only ordered record of conversation turns, owned by one session
#[derive(Debug, Default, Serialize)]
pub struct ConversationLedger {
    turns: Vec<ConversationTurn>,
}

impl ConversationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one turn. Never fails; amortized O(1).
    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(ConversationTurn {
            index: self.turns.len(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        });
    }

    /// Append a prompt turn immediately followed by the response it produced
    pub fn record_exchange(&mut self, prompt: &str, response: &str) {
        self.append(Role::System, prompt);
        self.append(Role::Assistant, response);
    }

    /// Immutable, order-preserving view of all turns
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Plain-text transcript artifact, one block per turn
    pub fn to_transcript(&self) -> String {
        let mut out = String::new();
        for turn in &self.turns {
            out.push_str(&format!("[{}] {}:\n{}\n\n", turn.index, turn.role, turn.content));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_order_and_indices() {
        let mut ledger = ConversationLedger::new();
        ledger.append(Role::System, "first");
        ledger.append(Role::Assistant, "second");
        ledger.append(Role::Human, "third");

        let turns = ledger.turns();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].content, "first");
        assert_eq!(turns[2].content, "third");
        for (i, turn) in turns.iter().enumerate() {
            assert_eq!(turn.index, i);
        }
    }

    #[test]
    fn record_exchange_appends_adjacent_pair() {
        let mut ledger = ConversationLedger::new();
        ledger.record_exchange("prompt text", "response text");
        ledger.record_exchange("again", "more");

        let turns = ledger.turns();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0].role, Role::System);
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[2].role, Role::System);
        assert_eq!(turns[3].role, Role::Assistant);
        assert_eq!(turns[1].content, "response text");
    }

    #[test]
    fn transcript_contains_every_turn() {
        let mut ledger = ConversationLedger::new();
        ledger.record_exchange("ask", "answer");
        let transcript = ledger.to_transcript();
        assert!(transcript.contains("[0] system:\nask"));
        assert!(transcript.contains("[1] assistant:\nanswer"));
    }

    #[test]
    fn new_ledger_is_empty() {
        let ledger = ConversationLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.len(), 0);
    }
}
