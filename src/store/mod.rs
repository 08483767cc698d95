//! Persistence layer: best-effort lead storage behind a document-store seam.

pub mod gateway;
pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use gateway::{ConnectionState, PersistenceGateway, spawn_initialize};
pub use libsql_backend::{LibSqlConnector, LibSqlDocumentStore};
pub use traits::{DocumentStore, LeadSink, StoreConnector, StoredDocument};
