//! Conversation step machine: tracks which prompt the visitor is answering.

use serde::{Deserialize, Serialize};

/// The steps of the lead conversation.
///
/// Cycles: AwaitingStart → AwaitingName → AwaitingEmail → AwaitingMessage →
/// AwaitingStart. The last edge is the reset after the lead is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStep {
    AwaitingStart,
    AwaitingName,
    AwaitingEmail,
    AwaitingMessage,
}

impl ConversationStep {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: ConversationStep) -> bool {
        use ConversationStep::*;
        matches!(
            (self, target),
            (AwaitingStart, AwaitingName)
                | (AwaitingName, AwaitingEmail)
                | (AwaitingEmail, AwaitingMessage)
                | (AwaitingMessage, AwaitingStart)
        )
    }

    /// Whether completing this step saves the lead and resets the cycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::AwaitingMessage)
    }

    /// The step that follows this one.
    pub fn next(&self) -> ConversationStep {
        use ConversationStep::*;
        match self {
            AwaitingStart => AwaitingName,
            AwaitingName => AwaitingEmail,
            AwaitingEmail => AwaitingMessage,
            AwaitingMessage => AwaitingStart,
        }
    }
}

impl Default for ConversationStep {
    fn default() -> Self {
        Self::AwaitingStart
    }
}

impl std::fmt::Display for ConversationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AwaitingStart => "awaiting_start",
            Self::AwaitingName => "awaiting_name",
            Self::AwaitingEmail => "awaiting_email",
            Self::AwaitingMessage => "awaiting_message",
        };
        write!(f, "{s}")
    }
}
