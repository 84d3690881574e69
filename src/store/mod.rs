//! Persistence backends for API key records.
//!
//! Services and handlers never reach a backend directly; they receive an
//! `Arc<dyn KeyStore>` built once at startup.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::api_key::{ApiKey, NewApiKey};

/// In-memory backend
pub mod memory;
/// PostgreSQL backend
pub mod postgres;

pub use memory::InMemoryKeyStore;
pub use postgres::PgKeyStore;

/// Raw record operations against a backend.
///
/// Implementations enforce name uniqueness (trimmed, case-insensitive) on
/// every write and report a violation as [`AppError::DuplicateName`]. That
/// check is authoritative; callers may pre-check but must not rely on it.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// All records, newest first.
    async fn list(&self) -> Result<Vec<ApiKey>, AppError>;

    /// Persist a new record. The store assigns `id` and `created_at`;
    /// `current_usage` starts at 0.
    async fn insert(&self, new_key: NewApiKey) -> Result<ApiKey, AppError>;

    /// Exact, case-sensitive lookup by secret.
    async fn find_by_secret(&self, secret: &str) -> Result<Option<ApiKey>, AppError>;

    /// Replace a record's name. Returns `None` when `id` does not exist.
    async fn update_name(&self, id: Uuid, name: &str) -> Result<Option<ApiKey>, AppError>;

    /// Remove a record permanently. Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
