//! Persistence gateway: tolerant wrapper around the external document store.
//!
//! The gateway owns the connection state. Initialization is attempted once;
//! configuration and connection failures are logged and leave persistence
//! disabled. Saving never returns an error: it reports `false` instead.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::{LEADS_COLLECTION, StoreConfig};
use crate::conversation::ConversationRecord;
use crate::error::{ConfigError, Result};
use crate::store::traits::{DocumentStore, LeadSink, StoreConnector};

/// Lifecycle of the store connection.
///
/// Uninitialized → Initializing → Ready | Failed. Never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

impl ConnectionState {
    /// Whether saves can be attempted.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

struct GatewayInner {
    state: ConnectionState,
    store: Option<Arc<dyn DocumentStore>>,
}

/// Persists completed leads to a document store, best-effort.
pub struct PersistenceGateway {
    config: Option<StoreConfig>,
    connector: Arc<dyn StoreConnector>,
    inner: RwLock<GatewayInner>,
}

impl PersistenceGateway {
    pub fn new(config: Option<StoreConfig>, connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            config,
            connector,
            inner: RwLock::new(GatewayInner {
                state: ConnectionState::Uninitialized,
                store: None,
            }),
        }
    }

    /// Current connection state.
    pub async fn state(&self) -> ConnectionState {
        self.inner.read().await.state
    }

    fn checked_config(&self) -> Result<&StoreConfig> {
        let config = self.config.as_ref().ok_or(ConfigError::MissingConfig)?;
        config.validate()?;
        Ok(config)
    }

    async fn open_store(&self, config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
        Ok(self.connector.connect(config).await?)
    }

    /// Try to connect to the store. Returns the resulting state.
    ///
    /// Only acts when Uninitialized; later calls just report the state.
    /// Missing configuration leaves the gateway Uninitialized.
    pub async fn initialize(&self) -> ConnectionState {
        let config = {
            let mut inner = self.inner.write().await;
            if inner.state != ConnectionState::Uninitialized {
                return inner.state;
            }
            let config = match self.checked_config() {
                Ok(config) => config.clone(),
                Err(e) => {
                    warn!("Persistence disabled: {}", e);
                    return inner.state;
                }
            };
            inner.state = ConnectionState::Initializing;
            config
        };

        // The lock is released while connecting so saves observe
        // Initializing and bail out instead of waiting.
        let result = self.open_store(&config).await;

        let mut inner = self.inner.write().await;
        match result {
            Ok(store) => {
                inner.store = Some(store);
                inner.state = ConnectionState::Ready;
                info!(url = %config.url, "Document store initialized, leads will be saved");
            }
            Err(e) => {
                inner.state = ConnectionState::Failed;
                warn!("Document store not initialized: {}", e);
            }
        }
        inner.state
    }

    async fn save_record(&self, record: ConversationRecord) -> bool {
        let store = {
            let inner = self.inner.read().await;
            match (&inner.store, inner.state) {
                (Some(store), ConnectionState::Ready) => Arc::clone(store),
                (_, state) => {
                    debug!(state = %state, "Store not ready, lead not saved");
                    return false;
                }
            }
        };

        let document = match serde_json::to_value(&record) {
            Ok(v) => v,
            Err(e) => {
                error!("Failed to serialize lead: {}", e);
                return false;
            }
        };

        match store.add_document(LEADS_COLLECTION, &document).await {
            Ok(id) => {
                info!(id = %id, collection = LEADS_COLLECTION, "Lead saved");
                true
            }
            Err(e) => {
                error!("Failed to save lead: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl LeadSink for PersistenceGateway {
    async fn save(&self, record: ConversationRecord) -> bool {
        self.save_record(record).await
    }
}

/// Spawn a one-shot initialization task. Callers are not expected to await it.
pub fn spawn_initialize(gateway: Arc<PersistenceGateway>) -> JoinHandle<ConnectionState> {
    tokio::spawn(async move { gateway.initialize().await })
}
