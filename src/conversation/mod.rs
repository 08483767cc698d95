//! Conversation: the linear lead-capture flow.
//!
//! The visitor is walked through a fixed sequence of prompts (name, email,
//! free-text note). Each turn is validated, stored in the record and answered
//! with the next prompt; the final turn hands the record to a [`LeadSink`]
//! and starts over.
//!
//! [`LeadSink`]: crate::store::LeadSink

pub mod engine;
pub mod model;
pub mod prompts;
pub mod state;

pub use engine::{ConversationEngine, InputGate, TurnOutcome};
pub use model::ConversationRecord;
pub use prompts::Prompt;
pub use state::ConversationStep;
