//! Input binding: wires a text field and its form to the conversation.
//!
//! Front-ends implement [`TextField`] and [`Form`] for their widgets and feed
//! [`InputEvent`]s through [`InputBinding::dispatch`].

use tracing::debug;

use crate::conversation::{ConversationEngine, TurnOutcome};
use crate::transcript::TranscriptContainer;

/// Key that clears and releases the field.
pub const CANCEL_KEY: &str = "Escape";

/// A single-line text input.
pub trait TextField {
    fn value(&self) -> String;
    fn set_value(&mut self, value: &str);
    fn focus(&mut self);
    fn blur(&mut self);
    /// Disable or re-enable typing.
    fn set_disabled(&mut self, disabled: bool);
    fn set_aria_label(&mut self, label: &str);
}

/// The submit-capable form wrapping the field.
pub trait Form {
    /// Mark the form busy while a turn is being processed.
    fn set_busy(&mut self, busy: bool);
}

/// Events the binding reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Submit,
    KeyDown { key: String },
}

impl InputEvent {
    pub fn key(key: impl Into<String>) -> Self {
        Self::KeyDown { key: key.into() }
    }
}

/// Result of dispatching an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventResult {
    /// Whether the default (navigating) form action was suppressed.
    pub default_prevented: bool,
    /// Outcome of the conversation turn, for submits.
    pub outcome: Option<TurnOutcome>,
}

/// Binds one field and form to a conversation engine.
pub struct InputBinding<Fm, Fd> {
    form: Fm,
    field: Fd,
}

impl<Fm: Form, Fd: TextField> InputBinding<Fm, Fd> {
    /// Wire up `form` and `field`. Returns `None` if either is missing.
    pub fn bind(form: Option<Fm>, field: Option<Fd>, label: &str) -> Option<Self> {
        let (Some(form), Some(mut field)) = (form, field) else {
            debug!("Chat form or input missing, events not wired");
            return None;
        };
        field.set_aria_label(label);
        Some(Self { form, field })
    }

    pub fn field(&self) -> &Fd {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut Fd {
        &mut self.field
    }

    pub fn form(&self) -> &Fm {
        &self.form
    }

    /// Handle one event.
    ///
    /// Submit: suppress the default action, hand the field value to the
    /// engine, clear the field and focus it again. The field is disabled
    /// until the turn (including any save) finishes.
    /// Escape: clear the field and blur it; the conversation is untouched.
    pub async fn dispatch(
        &mut self,
        event: InputEvent,
        engine: &mut ConversationEngine,
        transcript: &mut dyn TranscriptContainer,
    ) -> EventResult {
        match event {
            InputEvent::Submit => {
                let value = self.field.value();
                self.field.set_value("");
                self.field.set_disabled(true);
                self.form.set_busy(true);

                let outcome = engine.process(transcript, &value).await;

                self.form.set_busy(false);
                self.field.set_disabled(false);
                self.field.focus();
                EventResult {
                    default_prevented: true,
                    outcome: Some(outcome),
                }
            }
            InputEvent::KeyDown { key } if key == CANCEL_KEY => {
                self.field.set_value("");
                self.field.blur();
                EventResult::default()
            }
            InputEvent::KeyDown { .. } => EventResult::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::conversation::{ConversationRecord, ConversationStep};
    use crate::store::LeadSink;
    use crate::transcript::Transcript;

    #[derive(Debug, Default)]
    struct FakeField {
        value: String,
        focused: bool,
        disabled: bool,
        label: Option<String>,
        /// Every `set_disabled` call, in order.
        disabled_history: Vec<bool>,
    }

    impl TextField for FakeField {
        fn value(&self) -> String {
            self.value.clone()
        }
        fn set_value(&mut self, value: &str) {
            self.value = value.to_string();
        }
        fn focus(&mut self) {
            self.focused = true;
        }
        fn blur(&mut self) {
            self.focused = false;
        }
        fn set_disabled(&mut self, disabled: bool) {
            self.disabled = disabled;
            self.disabled_history.push(disabled);
        }
        fn set_aria_label(&mut self, label: &str) {
            self.label = Some(label.to_string());
        }
    }

    #[derive(Debug, Default)]
    struct FakeForm {
        busy_history: Vec<bool>,
    }

    impl Form for FakeForm {
        fn set_busy(&mut self, busy: bool) {
            self.busy_history.push(busy);
        }
    }

    struct NullSink;

    #[async_trait]
    impl LeadSink for NullSink {
        async fn save(&self, _record: ConversationRecord) -> bool {
            false
        }
    }

    fn engine() -> ConversationEngine {
        ConversationEngine::new(Arc::new(NullSink))
    }

    fn bound() -> InputBinding<FakeForm, FakeField> {
        InputBinding::bind(
            Some(FakeForm::default()),
            Some(FakeField::default()),
            "Type a message",
        )
        .unwrap()
    }

    #[test]
    fn missing_elements_are_not_wired() {
        assert!(
            InputBinding::<FakeForm, FakeField>::bind(None, Some(FakeField::default()), "x")
                .is_none()
        );
        assert!(
            InputBinding::<FakeForm, FakeField>::bind(Some(FakeForm::default()), None, "x")
                .is_none()
        );
    }

    #[test]
    fn bind_sets_accessibility_label() {
        let binding = bound();
        assert_eq!(binding.field().label.as_deref(), Some("Type a message"));
    }

    #[tokio::test]
    async fn submit_processes_clears_and_refocuses() {
        let mut binding = bound();
        let mut engine = engine();
        let mut transcript = Transcript::new();
        binding.field_mut().set_value("hi");

        let result = binding
            .dispatch(InputEvent::Submit, &mut engine, &mut transcript)
            .await;

        assert!(result.default_prevented);
        assert!(matches!(result.outcome, Some(TurnOutcome::Advanced { .. })));
        assert_eq!(engine.step(), ConversationStep::AwaitingName);
        assert_eq!(transcript.len(), 2);
        assert!(binding.field().value.is_empty());
        assert!(binding.field().focused);
        assert!(!binding.field().disabled);
        assert_eq!(binding.field().disabled_history, vec![true, false]);
        assert_eq!(binding.form().busy_history, vec![true, false]);
    }

    #[tokio::test]
    async fn submit_of_blank_field_is_ignored_but_still_prevented() {
        let mut binding = bound();
        let mut engine = engine();
        let mut transcript = Transcript::new();
        binding.field_mut().set_value("   ");

        let result = binding
            .dispatch(InputEvent::Submit, &mut engine, &mut transcript)
            .await;

        assert!(result.default_prevented);
        assert_eq!(result.outcome, Some(TurnOutcome::Ignored));
        assert!(transcript.is_empty());
        assert!(binding.field().value.is_empty());
    }

    #[tokio::test]
    async fn escape_clears_and_blurs_without_touching_state() {
        let mut binding = bound();
        let mut engine = engine();
        let mut transcript = Transcript::new();
        binding.field_mut().focus();
        binding.field_mut().set_value("half typed");

        let result = binding
            .dispatch(InputEvent::key("Escape"), &mut engine, &mut transcript)
            .await;

        assert_eq!(result, EventResult::default());
        assert!(binding.field().value.is_empty());
        assert!(!binding.field().focused);
        assert_eq!(engine.step(), ConversationStep::AwaitingStart);
        assert!(transcript.is_empty());
    }

    #[tokio::test]
    async fn other_keys_are_ignored() {
        let mut binding = bound();
        let mut engine = engine();
        let mut transcript = Transcript::new();
        binding.field_mut().set_value("abc");

        let result = binding
            .dispatch(InputEvent::key("Enter"), &mut engine, &mut transcript)
            .await;

        assert_eq!(result, EventResult::default());
        assert_eq!(binding.field().value, "abc");
    }
}
