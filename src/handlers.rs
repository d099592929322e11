pub mod due_dates;
pub mod health;
pub mod recurrence;
