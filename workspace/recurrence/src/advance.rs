//! Moves a recurrence from one occurrence to the next and answers whether a
//! given period is one of its occurrences.

use chrono::{Datelike, NaiveDate};

use crate::calendar::clamped_date;
use crate::calendar::utils::shift_month;
use crate::error::{RecurrenceError, Result};
use crate::period::PeriodKey;
use crate::schedule::{DueAnchor, FrequencyClass, RecurrencePolicy};

/// Returns the anchor date following `anchor_date`.
///
/// The step comes from the recurrence type, the day is reset to `due_day`
/// (clamped to the month length) and, when `due_month` is set, the month is
/// forced to it. The result is always strictly later than `anchor_date`: a
/// forced month that would not move forward lands one year later instead.
pub fn next_anchor(
    anchor_date: NaiveDate,
    policy: &RecurrencePolicy,
    anchor: &DueAnchor,
) -> Result<NaiveDate> {
    policy.validate()?;
    anchor.validate()?;

    let (mut year, mut month) = shift_month(anchor_date.year(), anchor_date.month(), policy.step_months() as i32);

    if let Some(due_month) = anchor.due_month {
        month = due_month;
        let forced = clamped_date(year, month, anchor.due_day).ok_or_else(|| out_of_range(anchor_date))?;
        if forced <= anchor_date {
            year += 1;
        }
    }

    clamped_date(year, month, anchor.due_day).ok_or_else(|| out_of_range(anchor_date))
}

/// True if `period` is one of the periods the recurrence falls in.
///
/// Fixed-month schedules are matched on the month alone: quarterly ones on
/// every third month counted from `due_month` (the quarters the due-date
/// calculator walks), every other type on `due_month` itself. Schedules
/// without a fixed month are due every `step_months()` periods counted from
/// `origin`, the period the template was created in; a one-month step is due
/// in every period.
pub fn is_due_in_period(
    origin: PeriodKey,
    policy: &RecurrencePolicy,
    anchor: &DueAnchor,
    period: PeriodKey,
) -> Result<bool> {
    policy.validate()?;
    anchor.validate()?;

    let step = policy.step_months() as i32;
    let due = match anchor.due_month {
        Some(due_month) if FrequencyClass::from(policy.recurrence_type) == FrequencyClass::Quarterly => {
            (period.month() as i32 - due_month as i32).rem_euclid(3) == 0
        }
        Some(due_month) => period.month() == due_month,
        None if step == 1 => true,
        None => {
            let elapsed = period.months_since(origin);
            elapsed >= 0 && elapsed % step == 0
        }
    };
    Ok(due)
}

fn out_of_range(from: NaiveDate) -> RecurrenceError {
    RecurrenceError::Date(format!("cannot advance past {from}"))
}
