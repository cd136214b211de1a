//! Meeting record store.
//!
//! Append-only: records are inserted once and never updated or deleted.

pub mod queries;

use async_trait::async_trait;
use sqlx::SqlitePool;
use thiserror::Error;

use crate::models::meeting::MeetingRecord;

/// Meeting store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),
}

/// Durable sink for meeting records.
#[async_trait]
pub trait MeetingStore: Send + Sync {
    /// Insert `record`, returning the store-assigned id.
    async fn save(&self, record: &MeetingRecord) -> Result<i64, StoreError>;
}

/// SQLite-backed [`MeetingStore`].
#[derive(Debug, Clone)]
pub struct SqliteMeetingStore {
    pool: SqlitePool,
}

impl SqliteMeetingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MeetingStore for SqliteMeetingStore {
    async fn save(&self, record: &MeetingRecord) -> Result<i64, StoreError> {
        queries::insert_meeting(&self.pool, record).await
    }
}
