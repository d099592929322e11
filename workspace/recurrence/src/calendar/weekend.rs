use chrono::{Datelike, NaiveDate, Weekday};
use model::entities::recurrence::WeekendPolicy;

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Moves a date off the weekend according to `policy`.
///
/// Weekdays are returned unchanged whatever the policy.
pub fn adjust_for_weekend(date: NaiveDate, policy: WeekendPolicy) -> NaiveDate {
    let step: fn(&NaiveDate) -> Option<NaiveDate> = match policy {
        WeekendPolicy::Keep => return date,
        WeekendPolicy::Postpone => NaiveDate::succ_opt,
        WeekendPolicy::Anticipate => NaiveDate::pred_opt,
    };

    let mut current = date;
    while is_weekend(current) {
        match step(&current) {
            Some(next) => current = next,
            None => break,
        }
    }
    current
}
