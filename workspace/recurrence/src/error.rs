use thiserror::Error;

use crate::entity::EntityKind;
use crate::store::StoreError;

/// Error types for the recurrence engine
#[derive(Error, Debug)]
pub enum RecurrenceError {
    /// A recurring entity carries a schedule that cannot produce dates
    /// (due day outside 1-31, month outside 1-12, interval outside 1-12...).
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    /// A period key that is not `YYYY-MM`
    #[error("Invalid period key: {0}")]
    InvalidPeriod(String),

    /// Date arithmetic left the range chrono can represent
    #[error("Date error: {0}")]
    Date(String),

    /// An installment plan that has no installment left to advance to
    #[error("Installment sequence exhausted: {current} of {count}")]
    InstallmentsExhausted { current: i32, count: i32 },

    /// Error from the backing store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A store call did not answer within the configured timeout
    #[error("Store call timed out after {0:?} while {1}")]
    Timeout(std::time::Duration, String),

    /// The store handed back a record of another kind
    #[error("Unexpected record kind: expected {expected}, got {actual}")]
    UnexpectedKind {
        expected: EntityKind,
        actual: EntityKind,
    },
}

/// Type alias for Result with RecurrenceError
pub type Result<T> = std::result::Result<T, RecurrenceError>;
