use chrono::{NaiveDate, NaiveDateTime};
use model::entities::installment;
use model::entities::recurrence::EntityStatus;
use sea_orm::prelude::Uuid;
use tracing::debug;

use super::{EntityKind, GenerationContext, Record, RecurringEntity, schedule_from_columns, unexpected_kind};
use crate::calendar::{add_months_clamped, installment_due_date};
use crate::error::{RecurrenceError, Result};
use crate::gate::SkipReason;
use crate::materialize::{CREATED_ACTION, generation_description};
use crate::period::PeriodKey;
use crate::schedule::Schedule;

impl RecurringEntity for installment::Model {
    const KIND: EntityKind = EntityKind::Installment;
    const ADVANCES_IN_PLACE: bool = true;

    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn client_id(&self) -> Option<Uuid> {
        self.client_id
    }

    fn parent_id(&self) -> Option<Uuid> {
        self.parent_installment_id
    }

    fn generated_for(&self) -> Option<&str> {
        self.generated_for.as_deref()
    }

    fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    fn auto_generate(&self) -> bool {
        self.auto_generate
    }

    fn end_date(&self) -> Option<NaiveDate> {
        self.recurrence_end_date
    }

    fn schedule(&self) -> Result<Schedule> {
        schedule_from_columns(
            self.recurrence_type,
            self.recurrence_interval,
            self.recurrence_end_date,
            self.auto_generate,
            self.due_day,
            self.due_month,
            self.weekend_policy,
        )
    }

    /// A plan is due for advancing once the period of its next payment has
    /// been reached, and never past its last payment.
    fn eligibility_extras(&self, period: PeriodKey) -> Result<Option<SkipReason>> {
        check_bounds(self)?;
        if is_exhausted(self) {
            return Ok(Some(SkipReason::InstallmentsExhausted));
        }

        let schedule = self.schedule()?;
        let next_payment = add_months_clamped(self.first_due_date, self.current_installment as u32, schedule.anchor.due_day)
            .ok_or_else(|| RecurrenceError::Date(format!("installment {} cannot be scheduled", self.id)))?;

        if PeriodKey::from_date(next_payment) > period {
            Ok(Some(SkipReason::NotDue))
        } else {
            Ok(None)
        }
    }

    /// Moves the plan to its next payment. The row keeps its id.
    fn build_instance(&self, ctx: &GenerationContext) -> Result<Self> {
        check_bounds(self)?;
        if is_exhausted(self) {
            return Err(RecurrenceError::InstallmentsExhausted {
                current: self.current_installment,
                count: self.installment_count,
            });
        }

        let schedule = self.schedule()?;
        let next = self.current_installment + 1;
        let due = installment_due_date(self.first_due_date, next, schedule.anchor.due_day, schedule.weekend_policy)?;

        debug!(
            "Advancing plan {} to installment {next} of {}, due {due}",
            self.id, self.installment_count
        );

        let mut history = self.history.clone();
        history.push(CREATED_ACTION, generation_description(ctx), ctx.now);

        Ok(installment::Model {
            current_installment: next,
            status: EntityStatus::Pending,
            completed_at: None,
            completed_by: None,
            realization_date: None,
            generated_for: Some(ctx.period.to_string()),
            history,
            ..self.clone()
        })
    }

    fn into_record(self) -> Record {
        Record::Installment(self)
    }

    fn from_record(record: Record) -> Result<Self> {
        match record {
            Record::Installment(model) => Ok(model),
            other => Err(unexpected_kind(Self::KIND, &other)),
        }
    }
}

/// `1 <= current <= count` must hold for every stored plan.
fn check_bounds(plan: &installment::Model) -> Result<()> {
    if plan.installment_count < 1
        || plan.current_installment < 1
        || plan.current_installment > plan.installment_count
    {
        return Err(RecurrenceError::InvalidSchedule(format!(
            "installment {} of {} is out of bounds",
            plan.current_installment, plan.installment_count
        )));
    }
    Ok(())
}

fn is_exhausted(plan: &installment::Model) -> bool {
    plan.current_installment >= plan.installment_count
}
