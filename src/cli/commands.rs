pub mod due_dates;
pub mod initdb;
pub mod run_recurrence;
pub mod serve;

pub use due_dates::list_due_dates;
pub use initdb::init_database;
pub use run_recurrence::run_recurrence;
pub use serve::serve;
