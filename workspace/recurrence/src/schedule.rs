//! The recurrence configuration carried by every tax, obligation and installment,
//! lifted out of the database rows into validated values.

use chrono::NaiveDate;
use model::entities::recurrence::{RecurrenceType, WeekendPolicy};

use crate::error::{RecurrenceError, Result};

/// Longest interval, in months, a custom recurrence may use.
pub const MAX_INTERVAL_MONTHS: u32 = 12;

/// How often and until when an entity regenerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrencePolicy {
    pub recurrence_type: RecurrenceType,
    /// Months between occurrences; only meaningful for `monthly` and `custom`.
    pub interval: Option<u32>,
    pub end_date: Option<NaiveDate>,
    pub auto_generate: bool,
}

impl RecurrencePolicy {
    pub fn new(
        recurrence_type: RecurrenceType,
        interval: Option<i32>,
        end_date: Option<NaiveDate>,
        auto_generate: bool,
    ) -> Result<Self> {
        let interval = match interval {
            Some(value) if value < 1 => {
                return Err(RecurrenceError::InvalidSchedule(format!(
                    "recurrence interval {value} is outside 1..={MAX_INTERVAL_MONTHS}"
                )));
            }
            other => other.map(|value| value as u32),
        };

        let policy = Self {
            recurrence_type,
            interval,
            end_date,
            auto_generate,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<()> {
        match self.interval {
            Some(value) if !(1..=MAX_INTERVAL_MONTHS).contains(&value) => {
                Err(RecurrenceError::InvalidSchedule(format!(
                    "recurrence interval {value} is outside 1..={MAX_INTERVAL_MONTHS}"
                )))
            }
            _ => Ok(()),
        }
    }

    /// Number of calendar months between two consecutive occurrences.
    pub fn step_months(&self) -> u32 {
        match self.recurrence_type {
            RecurrenceType::Monthly | RecurrenceType::Custom => self.interval.unwrap_or(1),
            RecurrenceType::Bimonthly => 2,
            RecurrenceType::Quarterly => 3,
            RecurrenceType::Semiannual => 6,
            RecurrenceType::Annual => 12,
        }
    }

    /// True once `today` is past the configured end date.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.end_date.is_some_and(|end| end < today)
    }
}

/// Where in the calendar an occurrence falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueAnchor {
    /// Day of month, 1-31; clamped to shorter months when dates are built.
    pub due_day: u32,
    /// Fixed calendar month for annual and quarterly schedules.
    pub due_month: Option<u32>,
}

impl DueAnchor {
    pub fn new(due_day: i32, due_month: Option<i32>) -> Result<Self> {
        if due_day < 1 || due_month.is_some_and(|month| month < 1) {
            return Err(RecurrenceError::InvalidSchedule(format!(
                "due day {due_day} / month {due_month:?} must be positive"
            )));
        }

        let anchor = Self {
            due_day: due_day as u32,
            due_month: due_month.map(|month| month as u32),
        };
        anchor.validate()?;
        Ok(anchor)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=31).contains(&self.due_day) {
            return Err(RecurrenceError::InvalidSchedule(format!(
                "due day {} is outside 1..=31",
                self.due_day
            )));
        }
        if let Some(month) = self.due_month {
            if !(1..=12).contains(&month) {
                return Err(RecurrenceError::InvalidSchedule(format!(
                    "due month {month} is outside 1..=12"
                )));
            }
        }
        Ok(())
    }
}

/// Coarse frequency used by the due-date calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyClass {
    Monthly,
    Quarterly,
    Annual,
    Custom,
}

impl From<RecurrenceType> for FrequencyClass {
    fn from(value: RecurrenceType) -> Self {
        match value {
            RecurrenceType::Monthly => FrequencyClass::Monthly,
            RecurrenceType::Quarterly => FrequencyClass::Quarterly,
            RecurrenceType::Annual => FrequencyClass::Annual,
            RecurrenceType::Bimonthly | RecurrenceType::Semiannual | RecurrenceType::Custom => {
                FrequencyClass::Custom
            }
        }
    }
}

/// Everything the engine needs to place an entity on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub policy: RecurrencePolicy,
    pub anchor: DueAnchor,
    pub weekend_policy: WeekendPolicy,
}

impl Schedule {
    pub fn frequency(&self) -> FrequencyClass {
        self.policy.recurrence_type.into()
    }
}
