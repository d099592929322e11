//! Everything the engine needs from persistence: bulk reads per kind, a
//! single-row upsert and the last-run marker.

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::DbErr;
use thiserror::Error;

use crate::entity::{EntityKind, Record};

pub mod database;
pub mod memory;

pub use database::SeaOrmStore;
pub use memory::InMemoryStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The stored last-run marker is not a `YYYY-MM-DD` date
    #[error("Invalid last-run marker: {0}")]
    InvalidMarker(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistence contract of the recurrence engine.
#[async_trait]
pub trait RecurrenceStore: Send + Sync {
    /// Every row of one kind, templates and generated instances alike.
    async fn fetch_all(&self, kind: EntityKind) -> StoreResult<Vec<Record>>;

    /// Inserts the row, or replaces the row with the same id.
    async fn upsert(&self, record: Record) -> StoreResult<()>;

    /// Date of the last completed (or checked) run.
    async fn last_run(&self) -> StoreResult<Option<NaiveDate>>;

    async fn set_last_run(&self, date: NaiveDate) -> StoreResult<()>;
}

pub(crate) const MARKER_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn parse_marker(value: &str) -> StoreResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), MARKER_FORMAT).map_err(|_| StoreError::InvalidMarker(value.to_string()))
}
