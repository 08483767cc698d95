//! Bot prompts emitted by the conversation engine.

use crate::config::ChatCopy;
use crate::transcript::emphasize;

/// A bot message the engine can emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    AskName,
    /// Greets the visitor by name and asks for an email address.
    GreetAndAskEmail { name: String },
    InvalidEmail,
    AskMessage,
    Saving,
    Saved,
    SaveFailed,
}

impl Prompt {
    /// Render the prompt as restricted markup using `copy`.
    ///
    /// The visitor's name is emphasized; any marker tokens inside it are
    /// removed first so it always renders as a single emphasis node.
    pub fn render(&self, copy: &ChatCopy) -> String {
        match self {
            Self::AskName => copy.ask_name.clone(),
            Self::GreetAndAskEmail { name } => {
                copy.greet_and_ask_email.replace("{name}", &emphasize(name))
            }
            Self::InvalidEmail => copy.invalid_email.clone(),
            Self::AskMessage => copy.ask_message.clone(),
            Self::Saving => copy.saving.clone(),
            Self::Saved => copy.saved.clone(),
            Self::SaveFailed => copy.save_failed.clone(),
        }
    }
}
