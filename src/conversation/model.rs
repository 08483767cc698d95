//! Lead record collected over one conversation cycle.

use serde::{Deserialize, Serialize};

/// Visitor contact details, filled in one step at a time.
///
/// Serialized as the persisted lead document; unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ConversationRecord {
    /// Whether every field has been collected.
    pub fn is_complete(&self) -> bool {
        self.name.is_some() && self.email.is_some() && self.message.is_some()
    }

    /// Whether no field has been collected.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.message.is_none()
    }
}
