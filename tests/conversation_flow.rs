//! End-to-end conversation tests.
//!
//! Each test drives the engine through the input binding exactly as a
//! front-end would, backed by a real `PersistenceGateway`: either on a
//! temporary libSQL file or with persistence left unconfigured.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use lead_chat::binding::{Form, InputBinding, InputEvent, TextField};
use lead_chat::config::{ChatCopy, StoreConfig};
use lead_chat::conversation::{ConversationEngine, ConversationStep, TurnOutcome};
use lead_chat::error::StoreError;
use lead_chat::store::{
    ConnectionState, DocumentStore, LibSqlConnector, LibSqlDocumentStore, PersistenceGateway,
    StoreConnector, spawn_initialize,
};
use lead_chat::transcript::{Node, Sender, Transcript};

#[derive(Default)]
struct Field {
    value: String,
}

impl TextField for Field {
    fn value(&self) -> String {
        self.value.clone()
    }
    fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
    }
    fn focus(&mut self) {}
    fn blur(&mut self) {}
    fn set_disabled(&mut self, _disabled: bool) {}
    fn set_aria_label(&mut self, _label: &str) {}
}

struct NoopForm;

impl Form for NoopForm {
    fn set_busy(&mut self, _busy: bool) {}
}

struct Harness {
    engine: ConversationEngine,
    binding: InputBinding<NoopForm, Field>,
    transcript: Transcript,
}

impl Harness {
    fn new(gateway: Arc<PersistenceGateway>) -> Self {
        Self {
            engine: ConversationEngine::new(gateway),
            binding: InputBinding::bind(Some(NoopForm), Some(Field::default()), "Type a message")
                .unwrap(),
            transcript: Transcript::new(),
        }
    }

    async fn say(&mut self, text: &str) -> TurnOutcome {
        self.binding.field_mut().set_value(text);
        self.binding
            .dispatch(InputEvent::Submit, &mut self.engine, &mut self.transcript)
            .await
            .outcome
            .unwrap()
    }

    fn last_bot_text(&self) -> String {
        self.transcript
            .messages()
            .iter()
            .rev()
            .find(|m| m.sender == Sender::Bot)
            .map(|m| m.plain_text())
            .unwrap_or_default()
    }
}

async fn file_gateway(path: &Path) -> Arc<PersistenceGateway> {
    let config = StoreConfig::new(path.to_string_lossy(), "test-key");
    let gateway = Arc::new(PersistenceGateway::new(
        Some(config),
        Arc::new(LibSqlConnector),
    ));
    assert_eq!(gateway.initialize().await, ConnectionState::Ready);
    gateway
}

#[tokio::test]
async fn scenario_a_invalid_email_then_full_save() {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("leads.db");
    let mut h = Harness::new(file_gateway(&db_path).await);

    h.say("hi").await;
    h.say("Ada").await;

    let outcome = h.say("not-an-email").await;
    assert_eq!(
        outcome,
        TurnOutcome::Rejected {
            step: ConversationStep::AwaitingEmail
        }
    );
    assert_eq!(h.engine.step(), ConversationStep::AwaitingEmail);
    assert!(h.engine.record().email.is_none());
    assert_eq!(h.last_bot_text(), ChatCopy::default().invalid_email);

    h.say("ada@example.com").await;
    let outcome = h.say("interested!").await;

    assert_eq!(outcome, TurnOutcome::Completed { saved: true });
    assert_eq!(h.engine.step(), ConversationStep::AwaitingStart);
    assert!(h.engine.record().is_empty());
    assert_eq!(h.last_bot_text(), ChatCopy::default().saved);

    // Reopen the file to check what actually landed in the store.
    let store = LibSqlDocumentStore::new_local(&db_path).await.unwrap();
    let docs = store.list_documents("leads").await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(
        docs[0].data,
        serde_json::json!({
            "name": "Ada",
            "email": "ada@example.com",
            "message": "interested!"
        })
    );
}

#[tokio::test]
async fn scenario_b_unconfigured_store_apologizes_and_discards() {
    let gateway = Arc::new(PersistenceGateway::new(None, Arc::new(LibSqlConnector)));
    assert_eq!(gateway.initialize().await, ConnectionState::Uninitialized);
    let mut h = Harness::new(Arc::clone(&gateway));

    for input in ["hi", "Ada", "ada@example.com"] {
        h.say(input).await;
    }
    let outcome = h.say("interested!").await;

    assert_eq!(outcome, TurnOutcome::Completed { saved: false });
    assert_eq!(h.last_bot_text(), ChatCopy::default().save_failed);
    assert!(h.engine.record().is_empty());
    assert_eq!(h.engine.step(), ConversationStep::AwaitingStart);
    // Not retried: the gateway never left Uninitialized.
    assert_eq!(gateway.state().await, ConnectionState::Uninitialized);
}

#[tokio::test]
async fn scenario_c_whitespace_changes_nothing() {
    let gateway = Arc::new(PersistenceGateway::new(None, Arc::new(LibSqlConnector)));
    let mut h = Harness::new(gateway);

    for next in ["hi", "Ada", "ada@example.com", "note"] {
        let before_len = h.transcript.len();
        let before_step = h.engine.step();

        assert_eq!(h.say("  ").await, TurnOutcome::Ignored);
        assert_eq!(h.transcript.len(), before_len);
        assert_eq!(h.engine.step(), before_step);

        h.say(next).await;
    }
}

#[tokio::test]
async fn save_before_initialize_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let config = StoreConfig::new(tmp.path().join("leads.db").to_string_lossy(), "key");
    let gateway = Arc::new(PersistenceGateway::new(
        Some(config),
        Arc::new(LibSqlConnector),
    ));
    let mut h = Harness::new(Arc::clone(&gateway));

    for input in ["hi", "Ada", "ada@example.com"] {
        h.say(input).await;
    }
    assert_eq!(
        h.say("note").await,
        TurnOutcome::Completed { saved: false }
    );
    assert_eq!(gateway.state().await, ConnectionState::Uninitialized);
}

/// Connector whose connection attempt never finishes.
struct StalledConnector;

#[async_trait]
impl StoreConnector for StalledConnector {
    async fn connect(&self, _config: &StoreConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn save_while_initializing_fails_without_waiting() {
    let gateway = Arc::new(PersistenceGateway::new(
        Some(StoreConfig::new("./never-opened.db", "key")),
        Arc::new(StalledConnector),
    ));
    let init = spawn_initialize(Arc::clone(&gateway));

    timeout(Duration::from_secs(1), async {
        while gateway.state().await != ConnectionState::Initializing {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("initialization should start");

    let mut h = Harness::new(Arc::clone(&gateway));
    for input in ["hi", "Ada", "ada@example.com"] {
        h.say(input).await;
    }
    let outcome = timeout(Duration::from_secs(1), h.say("note"))
        .await
        .expect("save must not wait for initialization");

    assert_eq!(outcome, TurnOutcome::Completed { saved: false });
    assert_eq!(h.last_bot_text(), ChatCopy::default().save_failed);
    assert_eq!(gateway.state().await, ConnectionState::Initializing);
    init.abort();
}

#[tokio::test]
async fn user_echo_precedes_each_bot_response() {
    let gateway = Arc::new(PersistenceGateway::new(None, Arc::new(LibSqlConnector)));
    let mut h = Harness::new(gateway);
    let inputs = ["hi", "Ada", "nope", "ada@example.com", "interested!"];

    let mut expected_user_positions = Vec::new();
    for input in inputs {
        expected_user_positions.push(h.transcript.len());
        h.say(input).await;
    }

    let messages = h.transcript.messages();
    for (pos, input) in expected_user_positions.iter().zip(inputs) {
        assert_eq!(messages[*pos].sender, Sender::User);
        assert_eq!(messages[*pos].plain_text(), input);
        assert_eq!(messages[*pos + 1].sender, Sender::Bot);
    }
    let user_count = messages.iter().filter(|m| m.sender == Sender::User).count();
    assert_eq!(user_count, inputs.len());
}

#[tokio::test]
async fn echoed_markup_cannot_inject_elements() {
    let gateway = Arc::new(PersistenceGateway::new(None, Arc::new(LibSqlConnector)));
    let mut h = Harness::new(gateway);

    h.say("hi").await;
    h.say("<img src=x onerror=alert(1)>").await;

    for message in h.transcript.messages() {
        assert!(message.nodes.iter().all(|n| matches!(
            n,
            Node::Text(_) | Node::LineBreak | Node::Emphasis(_)
        )));
    }
    let html = h.transcript.to_html();
    assert!(!html.contains("<img"));
    assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
}
