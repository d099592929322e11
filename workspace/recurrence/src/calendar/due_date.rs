use chrono::{Datelike, NaiveDate};
use model::entities::recurrence::WeekendPolicy;

use super::utils::{add_months_clamped, clamped_date};
use super::weekend::adjust_for_weekend;
use crate::error::{RecurrenceError, Result};
use crate::schedule::{DueAnchor, FrequencyClass};

/// Computes the next due date on or after `reference`.
///
/// Annual schedules with a fixed month land on that month this year or next;
/// quarterly schedules with a fixed month step by three months from it; every
/// other schedule lands on `due_day` of the reference month or the month after.
/// Days past the end of a short month are clamped, then the weekend policy is applied.
pub fn next_due_date(
    anchor: &DueAnchor,
    frequency: FrequencyClass,
    weekend_policy: WeekendPolicy,
    reference: NaiveDate,
) -> Result<NaiveDate> {
    let day = anchor.due_day;
    let candidate = match (frequency, anchor.due_month) {
        (FrequencyClass::Annual, Some(month)) => {
            let this_year = date_or_err(clamped_date(reference.year(), month, day))?;
            if this_year < reference {
                date_or_err(clamped_date(reference.year() + 1, month, day))?
            } else {
                this_year
            }
        }
        (FrequencyClass::Quarterly, Some(month)) => {
            let first = date_or_err(clamped_date(reference.year(), month, day))?;
            let mut candidate = first;
            let mut offset = 0;
            while candidate < reference {
                offset += 3;
                candidate = date_or_err(add_months_clamped(first, offset, day))?;
            }
            candidate
        }
        _ => {
            let this_month = date_or_err(clamped_date(reference.year(), reference.month(), day))?;
            if this_month < reference {
                date_or_err(add_months_clamped(this_month, 1, day))?
            } else {
                this_month
            }
        }
    };

    Ok(adjust_for_weekend(candidate, weekend_policy))
}

/// Due date of the `current`-th payment of an installment plan: the first due
/// date moved forward `current - 1` months, on `due_day`, weekend-adjusted.
pub fn installment_due_date(
    first_due_date: NaiveDate,
    current: i32,
    due_day: u32,
    weekend_policy: WeekendPolicy,
) -> Result<NaiveDate> {
    if current < 1 {
        return Err(RecurrenceError::InvalidSchedule(format!(
            "installment position {current} must be at least 1"
        )));
    }
    let date = date_or_err(add_months_clamped(first_due_date, (current - 1) as u32, due_day))?;
    Ok(adjust_for_weekend(date, weekend_policy))
}

fn date_or_err(date: Option<NaiveDate>) -> Result<NaiveDate> {
    date.ok_or_else(|| RecurrenceError::Date("due date is outside the supported calendar".to_string()))
}
