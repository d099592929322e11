use chrono::{NaiveDate, NaiveDateTime};
use model::entities::obligation;
use model::entities::recurrence::EntityStatus;
use sea_orm::prelude::Uuid;

use super::{EntityKind, GenerationContext, Record, RecurringEntity, schedule_from_columns, unexpected_kind};
use crate::error::Result;
use crate::materialize::fresh_history;
use crate::schedule::Schedule;

impl RecurringEntity for obligation::Model {
    const KIND: EntityKind = EntityKind::Obligation;

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
        self.parent_obligation_id
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

    fn build_instance(&self, ctx: &GenerationContext) -> Result<Self> {
        self.schedule()?;

        Ok(obligation::Model {
            id: Uuid::new_v4(),
            status: EntityStatus::Pending,
            completed_at: None,
            completed_by: None,
            realization_date: None,
            parent_obligation_id: Some(self.id),
            generated_for: Some(ctx.period.to_string()),
            created_at: ctx.now,
            history: fresh_history(ctx),
            ..self.clone()
        })
    }

    fn into_record(self) -> Record {
        Record::Obligation(self)
    }

    fn from_record(record: Record) -> Result<Self> {
        match record {
            Record::Obligation(model) => Ok(model),
            other => Err(unexpected_kind(Self::KIND, &other)),
        }
    }
}
