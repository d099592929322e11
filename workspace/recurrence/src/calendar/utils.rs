use chrono::{Datelike, NaiveDate};

/// Returns the number of days in the given month using chrono.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = shift_month(year, month, 1);

    // Go back one day from the first of the next month
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?
        .pred_opt()
        .map(|last| last.day())
}

/// Builds a date, pulling `day` back to the last day of the month when the
/// month is shorter (the 31st of February becomes the 28th or 29th).
pub fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    if !(1..=12).contains(&month) || day == 0 {
        return None;
    }
    let last_day = days_in_month(year, month)?;
    NaiveDate::from_ymd_opt(year, month, day.min(last_day))
}

/// Moves `date` forward by `months` calendar months and places it on `day`,
/// clamped to the length of the resulting month.
pub fn add_months_clamped(date: NaiveDate, months: u32, day: u32) -> Option<NaiveDate> {
    let (year, month) = shift_month(date.year(), date.month(), months as i32);
    clamped_date(year, month, day)
}

/// Adds `delta` months to a (year, month) pair.
pub(crate) fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let zero_based = year * 12 + (month as i32 - 1) + delta;
    (zero_based.div_euclid(12), (zero_based.rem_euclid(12) + 1) as u32)
}
