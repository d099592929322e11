//! The capability record every recurring entity kind provides to the engine.
//!
//! Taxes, obligations and installments run through the same gate and
//! orchestration code. What differs between them (which rows are templates,
//! how the next instance is built, extra eligibility rules) lives behind
//! [`RecurringEntity`].

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use model::entities::installment::Model as InstallmentModel;
use model::entities::obligation::Model as ObligationModel;
use model::entities::recurrence::{RecurrenceType, WeekendPolicy};
use model::entities::tax::Model as TaxModel;
use sea_orm::prelude::Uuid;

use crate::advance::is_due_in_period;
use crate::error::{RecurrenceError, Result};
use crate::gate::SkipReason;
use crate::period::PeriodKey;
use crate::schedule::{DueAnchor, RecurrencePolicy, Schedule};

mod installment;
mod obligation;
mod tax;

/// The three kinds of recurring entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Tax,
    Obligation,
    Installment,
}

impl EntityKind {
    /// Processing order of a run.
    pub const ALL: [EntityKind; 3] = [EntityKind::Tax, EntityKind::Obligation, EntityKind::Installment];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Tax => "tax",
            EntityKind::Obligation => "obligation",
            EntityKind::Installment => "installment",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of any recurring entity table, as exchanged with a store.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Tax(TaxModel),
    Obligation(ObligationModel),
    Installment(InstallmentModel),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Tax(_) => EntityKind::Tax,
            Record::Obligation(_) => EntityKind::Obligation,
            Record::Installment(_) => EntityKind::Installment,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Record::Tax(model) => model.id,
            Record::Obligation(model) => model.id,
            Record::Installment(model) => model.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Record::Tax(model) => &model.name,
            Record::Obligation(model) => &model.name,
            Record::Installment(model) => &model.name,
        }
    }
}

impl From<TaxModel> for Record {
    fn from(model: TaxModel) -> Self {
        Record::Tax(model)
    }
}

impl From<ObligationModel> for Record {
    fn from(model: ObligationModel) -> Self {
        Record::Obligation(model)
    }
}

impl From<InstallmentModel> for Record {
    fn from(model: InstallmentModel) -> Self {
        Record::Installment(model)
    }
}

/// Inputs shared by every instance built during one run.
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext {
    pub period: PeriodKey,
    pub now: NaiveDateTime,
}

impl GenerationContext {
    pub fn new(period: PeriodKey, now: NaiveDateTime) -> Self {
        Self { period, now }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }
}

/// A tax, obligation or installment as seen by the recurrence engine.
pub trait RecurringEntity: Clone + Send + Sync + Sized + 'static {
    const KIND: EntityKind;

    /// True when the kind moves its own row forward instead of spawning
    /// sibling rows; its own `generated_for` is then the idempotency key.
    const ADVANCES_IN_PLACE: bool = false;

    fn id(&self) -> Uuid;
    fn name(&self) -> &str;
    fn client_id(&self) -> Option<Uuid>;
    fn parent_id(&self) -> Option<Uuid>;
    fn generated_for(&self) -> Option<&str>;
    fn created_at(&self) -> NaiveDateTime;
    fn auto_generate(&self) -> bool;
    fn end_date(&self) -> Option<NaiveDate>;

    /// Validated recurrence configuration of the row.
    fn schedule(&self) -> Result<Schedule>;

    /// Rows users created by hand; only these drive generation.
    fn is_template(&self) -> bool {
        self.parent_id().is_none()
    }

    /// Kind-specific eligibility rules, evaluated after the auto-generate and
    /// end-date checks. The default skips periods the cadence does not reach,
    /// counting from the period the row was created in.
    fn eligibility_extras(&self, period: PeriodKey) -> Result<Option<SkipReason>> {
        let schedule = self.schedule()?;
        let origin = PeriodKey::from_date(self.created_at().date());
        if is_due_in_period(origin, &schedule.policy, &schedule.anchor, period)? {
            Ok(None)
        } else {
            Ok(Some(SkipReason::NotDue))
        }
    }

    /// Builds the row to persist for `ctx.period`.
    fn build_instance(&self, ctx: &GenerationContext) -> Result<Self>;

    fn into_record(self) -> Record;
    fn from_record(record: Record) -> Result<Self>;
}

/// Reads the recurrence columns every entity table shares.
pub(crate) fn schedule_from_columns(
    recurrence_type: RecurrenceType,
    recurrence_interval: Option<i32>,
    recurrence_end_date: Option<NaiveDate>,
    auto_generate: bool,
    due_day: i32,
    due_month: Option<i32>,
    weekend_policy: WeekendPolicy,
) -> Result<Schedule> {
    Ok(Schedule {
        policy: RecurrencePolicy::new(recurrence_type, recurrence_interval, recurrence_end_date, auto_generate)?,
        anchor: DueAnchor::new(due_day, due_month)?,
        weekend_policy,
    })
}

pub(crate) fn unexpected_kind(expected: EntityKind, record: &Record) -> RecurrenceError {
    RecurrenceError::UnexpectedKind {
        expected,
        actual: record.kind(),
    }
}
