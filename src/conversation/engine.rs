//! ConversationEngine: drives one visitor through the lead prompts.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::config::ChatCopy;
use crate::store::LeadSink;
use crate::transcript::{Sender, TranscriptContainer, render};
use crate::validation::EmailValidator;

use super::model::ConversationRecord;
use super::prompts::Prompt;
use super::state::ConversationStep;

/// What a single turn did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Input was empty after trimming; nothing happened.
    Ignored,
    /// The conversation moved to the next step.
    Advanced {
        from: ConversationStep,
        to: ConversationStep,
    },
    /// Input was rejected; the step is unchanged.
    Rejected { step: ConversationStep },
    /// The terminal step finished and the cycle was reset.
    Completed { saved: bool },
}

/// Shared view of whether the engine is accepting input.
///
/// Cloned out of the engine so a front-end can check it while a turn holds
/// the engine borrowed.
#[derive(Debug, Clone, Default)]
pub struct InputGate {
    save_pending: Arc<AtomicBool>,
}

impl InputGate {
    /// `false` while a save is in flight.
    pub fn is_accepting_input(&self) -> bool {
        !self.save_pending.load(Ordering::SeqCst)
    }
}

/// Marks a save as pending until dropped.
struct PendingSave<'a>(&'a AtomicBool);

impl<'a> PendingSave<'a> {
    fn begin(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for PendingSave<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Holds the current step and the record being collected.
///
/// `process` takes `&mut self`, so a turn (including a pending save) always
/// finishes before the next one can start.
pub struct ConversationEngine {
    step: ConversationStep,
    record: ConversationRecord,
    sink: Arc<dyn LeadSink>,
    validator: EmailValidator,
    copy: ChatCopy,
    gate: InputGate,
}

impl ConversationEngine {
    pub fn new(sink: Arc<dyn LeadSink>) -> Self {
        Self {
            step: ConversationStep::default(),
            record: ConversationRecord::default(),
            sink,
            validator: EmailValidator::default(),
            copy: ChatCopy::default(),
            gate: InputGate::default(),
        }
    }

    pub fn with_copy(mut self, copy: ChatCopy) -> Self {
        self.copy = copy;
        self
    }

    pub fn with_validator(mut self, validator: EmailValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Current step.
    pub fn step(&self) -> ConversationStep {
        self.step
    }

    /// Fields collected so far in this cycle.
    pub fn record(&self) -> &ConversationRecord {
        &self.record
    }

    pub fn copy(&self) -> &ChatCopy {
        &self.copy
    }

    /// `false` while the terminal step is waiting on the save.
    pub fn is_accepting_input(&self) -> bool {
        self.gate.is_accepting_input()
    }

    /// Handle for checking [`is_accepting_input`](Self::is_accepting_input)
    /// from outside a running turn.
    pub fn input_gate(&self) -> InputGate {
        self.gate.clone()
    }

    /// Handle one line of visitor input.
    ///
    /// Empty (after trimming) input is ignored entirely. Otherwise the input
    /// is echoed first, then the bot responds for the current step.
    pub async fn process(
        &mut self,
        transcript: &mut dyn TranscriptContainer,
        raw: &str,
    ) -> TurnOutcome {
        let value = raw.trim();
        if value.is_empty() {
            return TurnOutcome::Ignored;
        }

        render(transcript, value, Sender::User);

        match self.step {
            ConversationStep::AwaitingStart => {
                self.say(transcript, Prompt::AskName);
                self.advance()
            }
            ConversationStep::AwaitingName => {
                self.record.name = Some(value.to_string());
                self.say(
                    transcript,
                    Prompt::GreetAndAskEmail {
                        name: value.to_string(),
                    },
                );
                self.advance()
            }
            ConversationStep::AwaitingEmail => {
                if let Err(e) = self.validator.validate(value) {
                    debug!("Rejected email input: {}", e);
                    self.say(transcript, Prompt::InvalidEmail);
                    return TurnOutcome::Rejected { step: self.step };
                }
                self.record.email = Some(value.to_string());
                self.say(transcript, Prompt::AskMessage);
                self.advance()
            }
            ConversationStep::AwaitingMessage => {
                self.record.message = Some(value.to_string());
                self.say(transcript, Prompt::Saving);

                let record = std::mem::take(&mut self.record);
                let saved = {
                    let _pending = PendingSave::begin(&self.gate.save_pending);
                    self.sink.save(record).await
                };

                self.say(
                    transcript,
                    if saved {
                        Prompt::Saved
                    } else {
                        Prompt::SaveFailed
                    },
                );
                self.advance();
                info!(saved, "Lead conversation completed");
                TurnOutcome::Completed { saved }
            }
        }
    }

    fn say(&self, transcript: &mut dyn TranscriptContainer, prompt: Prompt) {
        render(transcript, &prompt.render(&self.copy), Sender::Bot);
    }

    fn advance(&mut self) -> TurnOutcome {
        let from = self.step;
        let to = from.next();
        debug_assert!(from.can_transition_to(to));
        self.step = to;
        debug!(from = %from, to = %to, "Conversation advanced");
        TurnOutcome::Advanced { from, to }
    }
}
