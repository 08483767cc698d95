//! Store capability traits.
//!
//! `DocumentStore` is the opaque external store client, `StoreConnector`
//! opens one from configuration, and `LeadSink` is the only thing the
//! conversation engine knows about persistence.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::StoreConfig;
use crate::conversation::ConversationRecord;
use crate::error::StoreError;

/// A document as stored in a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub collection: String,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Asynchronous document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Append `document` as a new document in `collection`. Returns its id.
    async fn add_document(
        &self,
        collection: &str,
        document: &serde_json::Value,
    ) -> Result<String, StoreError>;

    /// Number of documents in `collection`.
    async fn count_documents(&self, collection: &str) -> Result<usize, StoreError>;

    /// All documents in `collection`, oldest first.
    async fn list_documents(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError>;
}

/// Establishes a store connection from configuration.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self, config: &StoreConfig) -> Result<Arc<dyn DocumentStore>, StoreError>;
}

/// Best-effort destination for completed leads.
///
/// Implementations never fail loudly: `false` means the lead was not saved
/// and will not be retried.
#[async_trait]
pub trait LeadSink: Send + Sync {
    async fn save(&self, record: ConversationRecord) -> bool;
}
