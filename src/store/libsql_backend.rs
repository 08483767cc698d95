//! libSQL backend: `DocumentStore` implementation.
//!
//! Documents are JSON blobs in a single `documents` table keyed by
//! collection. Supports local files, in-memory databases and remote
//! `libsql://` databases authenticated with the configured credential key.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use secrecy::ExposeSecret;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::store::migrations;
use crate::store::traits::{DocumentStore, StoreConnector, StoredDocument};

/// libSQL document store.
///
/// Stores a single connection that is reused for all operations.
pub struct LibSqlDocumentStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlDocumentStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Connection(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to open libSQL database: {e}")))?;

        let store = Self::from_database(db).await?;
        info!(path = %path.display(), "Document store opened");
        Ok(store)
    }

    /// Connect to a remote database.
    pub async fn new_remote(url: &str, auth_token: &str) -> Result<Self, StoreError> {
        let db = libsql::Builder::new_remote(url.to_string(), auth_token.to_string())
            .build()
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to build remote client: {e}")))?;

        // Migrations are the first round trip, so an unreachable server or a
        // rejected token surfaces here.
        let store = Self::from_database(db).await?;
        info!(url = %url, "Remote document store connected");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                StoreError::Connection(format!("Failed to create in-memory database: {e}"))
            })?;
        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, StoreError> {
        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

fn row_to_document(row: &libsql::Row) -> Result<StoredDocument, StoreError> {
    let id: String = row
        .get(0)
        .map_err(|e| StoreError::Query(format!("document id: {e}")))?;
    let collection: String = row
        .get(1)
        .map_err(|e| StoreError::Query(format!("document collection: {e}")))?;
    let data_str: String = row
        .get(2)
        .map_err(|e| StoreError::Query(format!("document data: {e}")))?;
    let created_str: String = row
        .get(3)
        .map_err(|e| StoreError::Query(format!("document created_at: {e}")))?;

    let data = serde_json::from_str(&data_str)
        .map_err(|e| StoreError::Serialization(format!("document {id}: {e}")))?;

    Ok(StoredDocument {
        id,
        collection,
        data,
        created_at: parse_datetime(&created_str),
    })
}

#[async_trait]
impl DocumentStore for LibSqlDocumentStore {
    async fn add_document(
        &self,
        collection: &str,
        document: &serde_json::Value,
    ) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let data = serde_json::to_string(document)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        self.conn()
            .execute(
                "INSERT INTO documents (id, collection, data, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![id.clone(), collection, data, now],
            )
            .await
            .map_err(|e| StoreError::Save {
                collection: collection.to_string(),
                reason: e.to_string(),
            })?;

        debug!(id = %id, collection = %collection, "Document added");
        Ok(id)
    }

    async fn count_documents(&self, collection: &str) -> Result<usize, StoreError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT COUNT(*) FROM documents WHERE collection = ?1",
                params![collection],
            )
            .await
            .map_err(|e| StoreError::Query(format!("count_documents: {e}")))?;

        let row = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(format!("count_documents: {e}")))?;

        match row {
            Some(row) => {
                let count: i64 = row
                    .get(0)
                    .map_err(|e| StoreError::Query(format!("count_documents: {e}")))?;
                Ok(count.max(0) as usize)
            }
            None => Ok(0),
        }
    }

    async fn list_documents(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, collection, data, created_at FROM documents
                 WHERE collection = ?1 ORDER BY created_at, rowid",
                params![collection],
            )
            .await
            .map_err(|e| StoreError::Query(format!("list_documents: {e}")))?;

        let mut documents = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(format!("list_documents: {e}")))?
        {
            documents.push(row_to_document(&row)?);
        }
        Ok(documents)
    }
}

/// Opens a [`LibSqlDocumentStore`] from a [`StoreConfig`].
///
/// Remote URLs use the credential key as the auth token; anything else is
/// treated as a local file path.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibSqlConnector;

#[async_trait]
impl StoreConnector for LibSqlConnector {
    async fn connect(&self, config: &StoreConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
        let store = if config.is_remote() {
            let token = config
                .api_key
                .as_ref()
                .map(|k| k.expose_secret().to_string())
                .unwrap_or_default();
            LibSqlDocumentStore::new_remote(&config.url, &token).await?
        } else {
            LibSqlDocumentStore::new_local(Path::new(&config.url)).await?
        };
        Ok(Arc::new(store))
    }
}
