use std::sync::Arc;

use lead_chat::binding::InputBinding;
use lead_chat::channels::{CliChannel, TerminalField, TerminalForm, TerminalTranscript, run_session};
use lead_chat::config::{ChatCopy, LEADS_COLLECTION, StoreConfig};
use lead_chat::conversation::ConversationEngine;
use lead_chat::store::{LibSqlConnector, PersistenceGateway, spawn_initialize};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let store_config = StoreConfig::from_env();

    eprintln!("💬 lead-chat v{}", env!("CARGO_PKG_VERSION"));
    match &store_config {
        Some(config) => eprintln!("   Store: {} (collection: {})", config.url, LEADS_COLLECTION),
        None => eprintln!("   Store: not configured, leads will not be saved"),
    }
    eprintln!("   Type a message and press Enter. /cancel clears, /quit exits.\n");

    // ── Persistence ─────────────────────────────────────────────────────
    let gateway = Arc::new(PersistenceGateway::new(
        store_config,
        Arc::new(LibSqlConnector),
    ));
    // Not awaited: early turns don't need the store.
    let _init_handle = spawn_initialize(Arc::clone(&gateway));

    // ── Conversation ────────────────────────────────────────────────────
    let copy = ChatCopy::default();
    let mut engine = ConversationEngine::new(gateway).with_copy(copy.clone());
    let mut transcript = TerminalTranscript::stdout();

    let Some(mut binding) = InputBinding::bind(
        Some(TerminalForm),
        Some(TerminalField::new()),
        &copy.input_label,
    ) else {
        anyhow::bail!("terminal input could not be bound");
    };

    let channel = CliChannel::new();
    let inputs = channel.start();
    tracing::debug!(channel = channel.name(), "Channel started");

    run_session(inputs, &mut binding, &mut engine, &mut transcript).await?;

    eprintln!();
    Ok(())
}
