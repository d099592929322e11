pub mod due_date;
pub mod utils;
pub mod weekend;

pub use due_date::{installment_due_date, next_due_date};
pub use utils::{add_months_clamped, clamped_date, days_in_month};
pub use weekend::{adjust_for_weekend, is_weekend};
