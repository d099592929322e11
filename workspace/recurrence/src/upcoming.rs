use chrono::NaiveDate;
use common::UpcomingDueDateDto;
use model::entities::installment;
use model::entities::recurrence::EntityStatus;
use sea_orm::prelude::Uuid;
use tracing::warn;

use crate::calendar::{installment_due_date, next_due_date};
use crate::entity::{EntityKind, Record, RecurringEntity};
use crate::error::Result;
use crate::period::PeriodKey;

/// The next due date of one template.
#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingDueDate {
    pub kind: EntityKind,
    pub entity_id: Uuid,
    pub name: String,
    pub client_id: Option<Uuid>,
    pub due_date: NaiveDate,
}

impl UpcomingDueDate {
    pub fn period(&self) -> PeriodKey {
        PeriodKey::from_date(self.due_date)
    }
}

impl From<&UpcomingDueDate> for UpcomingDueDateDto {
    fn from(upcoming: &UpcomingDueDate) -> Self {
        Self {
            kind: upcoming.kind.to_string(),
            entity_id: upcoming.entity_id.to_string(),
            name: upcoming.name.clone(),
            client_id: upcoming.client_id.map(|id| id.to_string()),
            due_date: upcoming.due_date,
            period: upcoming.period().to_string(),
        }
    }
}

/// Next due date, on or after `reference`, of every template in `records`.
///
/// Taxes and obligations use the due-date calculator; installment plans report
/// the payment currently due. Templates whose recurrence ends before that date,
/// finished plans and rows with a malformed schedule are left out. The result is
/// sorted by due date, then name.
pub fn upcoming_due_dates(records: &[Record], reference: NaiveDate) -> Vec<UpcomingDueDate> {
    let mut upcoming: Vec<UpcomingDueDate> = records
        .iter()
        .filter_map(|record| {
            let next = match record {
                Record::Tax(model) => template_due_date(model, reference),
                Record::Obligation(model) => template_due_date(model, reference),
                Record::Installment(model) => plan_due_date(model),
            };
            match next {
                Ok(next) => next,
                Err(e) => {
                    warn!("Skipping {} {} in due-date listing: {}", record.kind(), record.id(), e);
                    None
                }
            }
        })
        .collect();

    upcoming.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.name.cmp(&b.name)));
    upcoming
}

fn template_due_date<E: RecurringEntity>(entity: &E, reference: NaiveDate) -> Result<Option<UpcomingDueDate>> {
    if !entity.is_template() {
        return Ok(None);
    }

    let schedule = entity.schedule()?;
    let due_date = next_due_date(&schedule.anchor, schedule.frequency(), schedule.weekend_policy, reference)?;
    if schedule.policy.end_date.is_some_and(|end| end < due_date) {
        return Ok(None);
    }

    Ok(Some(UpcomingDueDate {
        kind: E::KIND,
        entity_id: entity.id(),
        name: entity.name().to_string(),
        client_id: entity.client_id(),
        due_date,
    }))
}

fn plan_due_date(plan: &installment::Model) -> Result<Option<UpcomingDueDate>> {
    let finished = plan.current_installment >= plan.installment_count && plan.status == EntityStatus::Completed;
    if !plan.is_template() || finished {
        return Ok(None);
    }

    let schedule = plan.schedule()?;
    let due_date = installment_due_date(
        plan.first_due_date,
        plan.current_installment,
        schedule.anchor.due_day,
        schedule.weekend_policy,
    )?;

    Ok(Some(UpcomingDueDate {
        kind: EntityKind::Installment,
        entity_id: plan.id,
        name: format!("{} ({}/{})", plan.name, plan.current_installment, plan.installment_count),
        client_id: plan.client_id,
        due_date,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::GenerationContext;
    use crate::testing::{at, date, installment_plan, obligation_template, tax_template};

    #[test]
    fn test_lists_templates_sorted_by_date() {
        let tax = tax_template("ISS", 10);
        let obligation = obligation_template("DCTF", 15);
        let plan = installment_plan("Parcelamento", 2, 10);
        let records = vec![Record::from(obligation), Record::from(tax), Record::from(plan)];

        let upcoming = upcoming_due_dates(&records, date(2025, 2, 3));
        let listed: Vec<(EntityKind, NaiveDate)> = upcoming.iter().map(|u| (u.kind, u.due_date)).collect();

        assert_eq!(
            listed,
            vec![
                (EntityKind::Tax, date(2025, 2, 10)),
                (EntityKind::Obligation, date(2025, 2, 17)),
                (EntityKind::Installment, date(2025, 2, 20)),
            ]
        );
        // 2025-02-15 is a Saturday, postponed to Monday
        assert_eq!(upcoming[1].period().to_string(), "2025-02");
        assert_eq!(upcoming[2].name, "Parcelamento (2/10)");
    }

    #[test]
    fn test_generated_instances_are_not_listed() {
        let template = obligation_template("DCTF", 15);
        let ctx = GenerationContext::new(PeriodKey::new(2025, 2).unwrap(), at(2025, 2, 1, 6));
        let instance = template.build_instance(&ctx).unwrap();

        let upcoming = upcoming_due_dates(&[Record::from(template), Record::from(instance)], date(2025, 2, 3));
        assert_eq!(upcoming.len(), 1);
    }

    #[test]
    fn test_ended_and_broken_templates_are_left_out() {
        let mut ended = tax_template("ISS", 10);
        ended.recurrence_end_date = Some(date(2025, 2, 5));
        let mut broken = obligation_template("DCTF", 15);
        broken.due_month = Some(14);

        let upcoming = upcoming_due_dates(&[Record::from(ended), Record::from(broken)], date(2025, 2, 6));
        assert!(upcoming.is_empty());
    }

    #[test]
    fn test_dto_conversion() {
        let upcoming = upcoming_due_dates(&[Record::from(tax_template("ISS", 10))], date(2025, 2, 3));
        let dto = UpcomingDueDateDto::from(&upcoming[0]);

        assert_eq!(dto.kind, "tax");
        assert_eq!(dto.due_date, date(2025, 2, 10));
        assert_eq!(dto.period, "2025-02");
        assert_eq!(dto.client_id, None);
    }
}
