//! Recurrence and due-date engine.
//!
//! Computes when taxes, obligations and installment plans fall due, and
//! materializes each template's instance for a period at most once.

pub mod advance;
pub mod calendar;
pub mod entity;
pub mod error;
pub mod gate;
pub mod materialize;
pub mod period;
pub mod runner;
pub mod schedule;
pub mod store;
pub mod upcoming;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

pub use entity::{EntityKind, Record, RecurringEntity};
pub use error::{RecurrenceError, Result};
pub use period::PeriodKey;
pub use runner::{GenerationReport, RecurrenceRunner, RunOutcome, RunnerConfig};
pub use store::{InMemoryStore, RecurrenceStore, SeaOrmStore};

/// Returns the runner used by the server and the CLI: backed by the database,
/// with `store_timeout` applied to every store call.
pub fn default_runner(db: DatabaseConnection, store_timeout: Duration) -> RecurrenceRunner {
    RecurrenceRunner::new(Arc::new(SeaOrmStore::new(db)), RunnerConfig { store_timeout })
}
