//! The recurrence run: the first-of-month gated entry point that walks every
//! template of every kind through the gate and the materializer.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use common::{GenerationErrorDto, GenerationReportDto, RunStatus};
use model::entities::{installment, obligation, tax};
use sea_orm::prelude::Uuid;
use tracing::{debug, error, info, instrument, warn};

use crate::entity::{EntityKind, GenerationContext, Record, RecurringEntity};
use crate::error::{RecurrenceError, Result};
use crate::gate::{Eligibility, check_eligibility};
use crate::materialize::materialize;
use crate::period::PeriodKey;
use crate::store::{RecurrenceStore, StoreResult};
use crate::upcoming::{UpcomingDueDate, upcoming_due_dates};

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct RunnerConfig {
    /// Upper bound for every single store call.
    pub store_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

/// A failure collected during a run. The run carries on after recording it.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationError {
    /// `None` when the failure is not tied to one kind (the last-run marker).
    pub kind: Option<EntityKind>,
    pub entity_id: Option<Uuid>,
    pub entity_name: Option<String>,
    pub message: String,
}

impl GenerationError {
    fn for_entity<E: RecurringEntity>(entity: &E, error: &RecurrenceError) -> Self {
        Self {
            kind: Some(E::KIND),
            entity_id: Some(entity.id()),
            entity_name: Some(entity.name().to_string()),
            message: error.to_string(),
        }
    }

    fn for_kind(kind: EntityKind, error: &RecurrenceError) -> Self {
        Self {
            kind: Some(kind),
            entity_id: None,
            entity_name: None,
            message: error.to_string(),
        }
    }
}

/// Counts and failures of a run that got past the date gates.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub period: PeriodKey,
    pub taxes_generated: usize,
    pub obligations_generated: usize,
    pub installments_generated: usize,
    pub errors: Vec<GenerationError>,
    /// Kinds whose rows could not be fetched at all.
    pub failed_kinds: Vec<EntityKind>,
}

impl GenerationReport {
    fn new(period: PeriodKey) -> Self {
        Self {
            period,
            taxes_generated: 0,
            obligations_generated: 0,
            installments_generated: 0,
            errors: Vec::new(),
            failed_kinds: Vec::new(),
        }
    }

    fn count(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Tax => self.taxes_generated += 1,
            EntityKind::Obligation => self.obligations_generated += 1,
            EntityKind::Installment => self.installments_generated += 1,
        }
    }

    pub fn generated(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Tax => self.taxes_generated,
            EntityKind::Obligation => self.obligations_generated,
            EntityKind::Installment => self.installments_generated,
        }
    }

    pub fn total_generated(&self) -> usize {
        self.taxes_generated + self.obligations_generated + self.installments_generated
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.failed_kinds.is_empty()
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The marker already holds today's date.
    AlreadyRanToday,
    /// Not the first of the month; today was recorded as checked.
    NotFirstOfMonth,
    Completed(GenerationReport),
}

impl RunOutcome {
    pub fn report(&self) -> Option<&GenerationReport> {
        match self {
            RunOutcome::Completed(report) => Some(report),
            _ => None,
        }
    }

    /// True when no kind could be fetched.
    pub fn is_total_failure(&self) -> bool {
        self.report()
            .is_some_and(|report| report.failed_kinds.len() == EntityKind::ALL.len())
    }
}

impl From<&GenerationError> for GenerationErrorDto {
    fn from(error: &GenerationError) -> Self {
        Self {
            kind: error.kind.map_or("run", |kind| kind.as_str()).to_string(),
            entity_id: error.entity_id.map(|id| id.to_string()),
            entity_name: error.entity_name.clone(),
            message: error.message.clone(),
        }
    }
}

impl From<&RunOutcome> for GenerationReportDto {
    fn from(outcome: &RunOutcome) -> Self {
        let skipped = |status| GenerationReportDto {
            status,
            period: None,
            taxes_generated: 0,
            obligations_generated: 0,
            installments_generated: 0,
            errors: Vec::new(),
        };

        match outcome {
            RunOutcome::AlreadyRanToday => skipped(RunStatus::AlreadyRanToday),
            RunOutcome::NotFirstOfMonth => skipped(RunStatus::NotFirstOfMonth),
            RunOutcome::Completed(report) => GenerationReportDto {
                status: if report.is_clean() {
                    RunStatus::Completed
                } else {
                    RunStatus::Partial
                },
                period: Some(report.period.to_string()),
                taxes_generated: report.taxes_generated,
                obligations_generated: report.obligations_generated,
                installments_generated: report.installments_generated,
                errors: report.errors.iter().map(GenerationErrorDto::from).collect(),
            },
        }
    }
}

/// Runs recurrence generation against a [`RecurrenceStore`].
///
/// The runner holds no clock and no mutable state: the caller passes `now`,
/// and the only memory between runs is the store's last-run marker.
#[derive(Clone)]
pub struct RecurrenceRunner {
    store: Arc<dyn RecurrenceStore>,
    config: RunnerConfig,
}

impl fmt::Debug for RecurrenceRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecurrenceRunner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RecurrenceRunner {
    pub fn new(store: Arc<dyn RecurrenceStore>, config: RunnerConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs generation for the period containing `now`.
    ///
    /// Unless `force` is set, a run exits early when the marker already holds
    /// today's date, and on any day but the first of the month it only records
    /// today as checked. Per-entity failures and per-kind fetch failures end up
    /// in the report; only marker reads and gate-stage marker writes fail the
    /// whole call.
    #[instrument(skip(self))]
    pub async fn run(&self, now: NaiveDateTime, force: bool) -> Result<RunOutcome> {
        let today = now.date();

        if !force {
            let last_run = self.timed("reading the last-run marker", self.store.last_run()).await?;
            if last_run == Some(today) {
                debug!("Recurrence already ran on {}", today);
                return Ok(RunOutcome::AlreadyRanToday);
            }

            if today.day() != 1 {
                self.timed("recording the check", self.store.set_last_run(today)).await?;
                debug!("{} is not the first of the month, nothing to generate", today);
                return Ok(RunOutcome::NotFirstOfMonth);
            }
        }

        let ctx = GenerationContext::new(PeriodKey::from_date(today), now);
        info!("Generating recurring entities for {}{}", ctx.period, if force { " (forced)" } else { "" });

        let mut report = GenerationReport::new(ctx.period);
        self.run_kind::<tax::Model>(&ctx, force, &mut report).await;
        self.run_kind::<obligation::Model>(&ctx, force, &mut report).await;
        self.run_kind::<installment::Model>(&ctx, force, &mut report).await;

        if report.failed_kinds.is_empty() {
            if let Err(e) = self.timed("saving the last-run marker", self.store.set_last_run(today)).await {
                error!("Failed to save the last-run marker: {}", e);
                report.errors.push(GenerationError {
                    kind: None,
                    entity_id: None,
                    entity_name: None,
                    message: e.to_string(),
                });
            }
        } else {
            warn!("Last-run marker left untouched, failed kinds: {:?}", report.failed_kinds);
        }

        info!(
            "Recurrence run for {} done: {} taxes, {} obligations, {} installments, {} errors",
            report.period,
            report.taxes_generated,
            report.obligations_generated,
            report.installments_generated,
            report.errors.len()
        );
        Ok(RunOutcome::Completed(report))
    }

    /// Next due date of every template, sorted by date.
    #[instrument(skip(self))]
    pub async fn upcoming(&self, reference: NaiveDate) -> Result<Vec<UpcomingDueDate>> {
        let mut records = Vec::new();
        for kind in EntityKind::ALL {
            records.extend(self.timed(&format!("fetching {kind} rows"), self.store.fetch_all(kind)).await?);
        }
        Ok(upcoming_due_dates(&records, reference))
    }

    async fn run_kind<E: RecurringEntity>(&self, ctx: &GenerationContext, force: bool, report: &mut GenerationReport) {
        let records = match self.timed(&format!("fetching {} rows", E::KIND), self.store.fetch_all(E::KIND)).await {
            Ok(records) => records,
            Err(e) => {
                error!("Failed to fetch {} rows: {}", E::KIND, e);
                report.errors.push(GenerationError::for_kind(E::KIND, &e));
                report.failed_kinds.push(E::KIND);
                return;
            }
        };

        let mut rows: Vec<E> = Vec::with_capacity(records.len());
        for record in records {
            let id = record.id();
            match E::from_record(record) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!("Store returned a foreign row {}: {}", id, e);
                    report.errors.push(GenerationError {
                        kind: Some(E::KIND),
                        entity_id: Some(id),
                        entity_name: None,
                        message: e.to_string(),
                    });
                }
            }
        }

        let templates: Vec<E> = rows.iter().filter(|row| row.is_template()).cloned().collect();
        debug!("{} {} templates to evaluate for {}", templates.len(), E::KIND, ctx.period);

        for template in &templates {
            match self.generate_one(template, ctx, &rows, force).await {
                Ok(Some(instance)) => {
                    report.count(E::KIND);
                    // Later templates must see this instance as a sibling
                    if !E::ADVANCES_IN_PLACE {
                        rows.push(instance);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Failed to generate {} {} ({}): {}", E::KIND, template.id(), template.name(), e);
                    report.errors.push(GenerationError::for_entity(template, &e));
                }
            }
        }
    }

    async fn generate_one<E: RecurringEntity>(
        &self,
        template: &E,
        ctx: &GenerationContext,
        siblings: &[E],
        force: bool,
    ) -> Result<Option<E>> {
        if let Eligibility::Skip(_) = check_eligibility(template, ctx.period, siblings, ctx.today(), force)? {
            return Ok(None);
        }

        let instance = materialize(template, ctx)?;
        self.timed(
            &format!("saving {} {}", E::KIND, instance.id()),
            self.store.upsert(instance.clone().into_record()),
        )
        .await?;

        debug!("Generated {} {} for {}", E::KIND, instance.id(), ctx.period);
        Ok(Some(instance))
    }

    async fn timed<T, F>(&self, action: &str, call: F) -> Result<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match tokio::time::timeout(self.config.store_timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(RecurrenceError::Timeout(self.config.store_timeout, action.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, SeaOrmStore};
    use crate::testing::{at, date, installment_plan, obligation_template, setup_db, tax_template};
    use model::entities::recurrence::{EntityStatus, RecurrenceType};

    fn runner(store: Arc<InMemoryStore>) -> RecurrenceRunner {
        RecurrenceRunner::new(store, RunnerConfig::default())
    }

    fn obligations(records: &[Record]) -> Vec<obligation::Model> {
        records
            .iter()
            .filter_map(|record| match record {
                Record::Obligation(model) => Some(model.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_monthly_obligation_generated_for_period() {
        let template = obligation_template("DCTF", 15);
        let store = Arc::new(InMemoryStore::with_records([Record::from(template.clone())]));
        store.set_marker(Some(date(2025, 1, 31))).await;

        let outcome = runner(store.clone()).run(at(2025, 2, 1, 6), false).await.unwrap();
        let report = outcome.report().unwrap();

        assert_eq!(report.period.to_string(), "2025-02");
        assert_eq!(report.obligations_generated, 1);
        assert!(report.is_clean());

        let rows = obligations(&store.records().await);
        let generated: Vec<_> = rows.iter().filter(|row| row.parent_obligation_id == Some(template.id)).collect();
        assert_eq!(generated.len(), 1);
        assert_eq!(generated[0].generated_for.as_deref(), Some("2025-02"));
        assert_eq!(generated[0].status, EntityStatus::Pending);
        assert_eq!(store.last_run().await.unwrap(), Some(date(2025, 2, 1)));
    }

    #[tokio::test]
    async fn test_rerun_same_day_is_a_no_op() {
        let store = Arc::new(InMemoryStore::with_records([Record::from(obligation_template("DCTF", 15))]));
        let runner = runner(store.clone());

        runner.run(at(2025, 2, 1, 6), false).await.unwrap();
        let before = store.records().await;

        let outcome = runner.run(at(2025, 2, 1, 18), false).await.unwrap();
        assert_eq!(outcome, RunOutcome::AlreadyRanToday);
        assert_eq!(store.records().await, before);
    }

    #[tokio::test]
    async fn test_rerun_without_marker_generates_nothing_new() {
        let store = Arc::new(InMemoryStore::with_records([
            Record::from(obligation_template("DCTF", 15)),
            Record::from(tax_template("ISS", 10)),
        ]));
        let runner = runner(store.clone());

        runner.run(at(2025, 2, 1, 6), false).await.unwrap();
        let before = store.records().await;

        // Losing the marker must not produce duplicates
        store.set_marker(None).await;
        let outcome = runner.run(at(2025, 2, 1, 7), false).await.unwrap();
        let report = outcome.report().unwrap();

        assert_eq!(report.total_generated(), 0);
        assert!(report.is_clean());
        assert_eq!(store.records().await, before);
    }

    #[tokio::test]
    async fn test_expired_template_is_skipped() {
        let mut template = obligation_template("DCTF", 15);
        template.recurrence_end_date = Some(date(2025, 1, 15));
        let store = Arc::new(InMemoryStore::with_records([Record::from(template)]));

        let outcome = runner(store.clone()).run(at(2025, 2, 1, 6), false).await.unwrap();
        let report = outcome.report().unwrap();

        assert_eq!(report.obligations_generated, 0);
        assert!(report.is_clean());
        assert_eq!(store.records().await.len(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_installment_is_left_alone() {
        let plan = installment_plan("Parcelamento", 10, 10);
        let store = Arc::new(InMemoryStore::with_records([Record::from(plan.clone())]));

        let outcome = runner(store.clone()).run(at(2025, 12, 1, 6), false).await.unwrap();
        let report = outcome.report().unwrap();

        assert_eq!(report.installments_generated, 0);
        assert!(report.is_clean());
        assert_eq!(store.records().await, vec![Record::Installment(plan)]);
    }

    #[tokio::test]
    async fn test_installment_advances_in_place() {
        let plan = installment_plan("Parcelamento", 1, 3);
        let store = Arc::new(InMemoryStore::with_records([Record::from(plan.clone())]));
        let runner = runner(store.clone());

        for (month, expected) in [(2, 2), (3, 3), (4, 3), (5, 3)] {
            runner.run(at(2025, month, 1, 6), false).await.unwrap();

            let records = store.records().await;
            assert_eq!(records.len(), 1);
            match &records[0] {
                Record::Installment(row) => {
                    assert_eq!(row.id, plan.id);
                    assert_eq!(row.current_installment, expected, "after run in month {month}");
                    assert!(row.current_installment <= row.installment_count);
                }
                other => panic!("unexpected record {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_not_first_of_month_records_check() {
        let store = Arc::new(InMemoryStore::with_records([Record::from(obligation_template("DCTF", 15))]));
        let runner = runner(store.clone());

        let outcome = runner.run(at(2025, 2, 14, 9), false).await.unwrap();
        assert_eq!(outcome, RunOutcome::NotFirstOfMonth);
        assert_eq!(store.last_run().await.unwrap(), Some(date(2025, 2, 14)));
        assert_eq!(store.records().await.len(), 1);

        let again = runner.run(at(2025, 2, 14, 15), false).await.unwrap();
        assert_eq!(again, RunOutcome::AlreadyRanToday);
    }

    #[tokio::test]
    async fn test_force_runs_mid_month() {
        let store = Arc::new(InMemoryStore::with_records([Record::from(obligation_template("DCTF", 15))]));
        store.set_marker(Some(date(2025, 2, 14))).await;

        let outcome = runner(store.clone()).run(at(2025, 2, 14, 9), true).await.unwrap();
        assert_eq!(outcome.report().unwrap().obligations_generated, 1);
    }

    #[tokio::test]
    async fn test_forced_run_on_template_created_after_due_day() {
        let mut template = obligation_template("DCTF", 10);
        template.created_at = at(2025, 2, 14, 8);
        let store = Arc::new(InMemoryStore::with_records([Record::from(template.clone())]));

        let outcome = runner(store.clone()).run(at(2025, 2, 14, 9), true).await.unwrap();
        let report = outcome.report().unwrap();

        assert_eq!(report.obligations_generated, 1);
        assert!(report.is_clean());
        let generated = obligations(&store.records().await)
            .into_iter()
            .filter(|row| row.parent_obligation_id == Some(template.id))
            .count();
        assert_eq!(generated, 1);
    }

    /// Months of 2025 in which `template` got an instance, running on the
    /// first of every month.
    async fn generated_months(template: tax::Model) -> Vec<u32> {
        let store = Arc::new(InMemoryStore::with_records([Record::from(template)]));
        let runner = runner(store);

        let mut months = Vec::new();
        for month in 1..=12 {
            let outcome = runner.run(at(2025, month, 1, 6), false).await.unwrap();
            let report = outcome.report().unwrap();
            assert!(report.is_clean(), "errors in month {month}: {:?}", report.errors);
            if report.taxes_generated == 1 {
                months.push(month);
            }
        }
        months
    }

    fn cadence(recurrence_type: RecurrenceType, interval: Option<i32>, due_month: Option<i32>) -> tax::Model {
        let mut template = tax_template("IRPJ", 20);
        template.recurrence_type = recurrence_type;
        template.recurrence_interval = interval;
        template.due_month = due_month;
        template
    }

    #[tokio::test]
    async fn test_generation_follows_cadence_over_a_year() {
        let cases = [
            (cadence(RecurrenceType::Monthly, None, None), (1..=12).collect::<Vec<u32>>()),
            (cadence(RecurrenceType::Monthly, Some(3), None), vec![1, 4, 7, 10]),
            (cadence(RecurrenceType::Bimonthly, None, None), vec![1, 3, 5, 7, 9, 11]),
            (cadence(RecurrenceType::Quarterly, None, None), vec![1, 4, 7, 10]),
            (cadence(RecurrenceType::Quarterly, None, Some(1)), vec![1, 4, 7, 10]),
            (cadence(RecurrenceType::Quarterly, None, Some(2)), vec![2, 5, 8, 11]),
            (cadence(RecurrenceType::Semiannual, None, None), vec![1, 7]),
            (cadence(RecurrenceType::Annual, None, None), vec![1]),
            (cadence(RecurrenceType::Annual, None, Some(4)), vec![4]),
        ];

        for (template, expected) in cases {
            let label = format!("{:?}/{:?}/{:?}", template.recurrence_type, template.recurrence_interval, template.due_month);
            assert_eq!(generated_months(template).await, expected, "{label}");
        }
    }

    #[tokio::test]
    async fn test_quarterly_generation_matches_listed_due_dates() {
        let template = cadence(RecurrenceType::Quarterly, None, Some(1));
        let store = Arc::new(InMemoryStore::with_records([Record::from(template)]));
        let runner = runner(store);

        for month in [2, 5, 8] {
            let listed = runner.upcoming(date(2025, month, 1)).await.unwrap();
            let due_period = listed[0].period();

            let outcome = runner.run(due_period.first_day().unwrap().and_hms_opt(6, 0, 0).unwrap(), false).await.unwrap();
            assert_eq!(outcome.report().unwrap().taxes_generated, 1, "period {due_period}");
        }
    }

    #[tokio::test]
    async fn test_force_does_not_bypass_auto_generate() {
        let mut template = obligation_template("DCTF", 15);
        template.auto_generate = false;
        let store = Arc::new(InMemoryStore::with_records([Record::from(template)]));

        let outcome = runner(store.clone()).run(at(2025, 2, 14, 9), true).await.unwrap();
        assert_eq!(outcome.report().unwrap().total_generated(), 0);
        assert_eq!(store.records().await.len(), 1);
    }

    #[tokio::test]
    async fn test_forced_duplicate_is_rejected_by_the_store() {
        let store = Arc::new(InMemoryStore::with_records([Record::from(obligation_template("DCTF", 15))]));
        let runner = runner(store.clone());

        runner.run(at(2025, 2, 1, 6), false).await.unwrap();
        let outcome = runner.run(at(2025, 2, 1, 7), true).await.unwrap();
        let report = outcome.report().unwrap();

        assert_eq!(report.obligations_generated, 0);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(store.records().await.len(), 2);
    }

    #[tokio::test]
    async fn test_one_broken_entity_does_not_abort_the_batch() {
        let mut broken = obligation_template("Broken", 15);
        broken.due_day = 45;
        let healthy = obligation_template("DCTF", 15);
        let store = Arc::new(InMemoryStore::with_records([Record::from(broken.clone()), Record::from(healthy)]));

        let outcome = runner(store.clone()).run(at(2025, 2, 1, 6), false).await.unwrap();
        let report = outcome.report().unwrap();

        assert_eq!(report.obligations_generated, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].entity_id, Some(broken.id));
        assert!(report.failed_kinds.is_empty());

        let dto = GenerationReportDto::from(&outcome);
        assert_eq!(dto.status, RunStatus::Partial);
        assert_eq!(dto.errors[0].kind, "obligation");
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_other_kinds_and_marker() {
        let store = Arc::new(InMemoryStore::with_records([
            Record::from(tax_template("ISS", 10)),
            Record::from(obligation_template("DCTF", 15)),
        ]));
        store.set_marker(Some(date(2025, 1, 31))).await;
        store.fail_fetch(EntityKind::Tax).await;

        let outcome = runner(store.clone()).run(at(2025, 2, 1, 6), false).await.unwrap();
        let report = outcome.report().unwrap();

        assert_eq!(report.failed_kinds, vec![EntityKind::Tax]);
        assert_eq!(report.obligations_generated, 1);
        assert!(!outcome.is_total_failure());
        // The marker stays behind so the next trigger retries
        assert_eq!(store.last_run().await.unwrap(), Some(date(2025, 1, 31)));
    }

    #[tokio::test]
    async fn test_every_kind_failing_is_a_total_failure() {
        let store = Arc::new(InMemoryStore::new());
        for kind in EntityKind::ALL {
            store.fail_fetch(kind).await;
        }

        let outcome = runner(store).run(at(2025, 2, 1, 6), false).await.unwrap();
        assert!(outcome.is_total_failure());
    }

    #[tokio::test]
    async fn test_failed_upsert_is_reported_per_entity() {
        let store = Arc::new(InMemoryStore::with_records([
            Record::from(tax_template("ISS", 10)),
            Record::from(obligation_template("DCTF", 15)),
        ]));
        store.fail_upserts().await;

        let outcome = runner(store.clone()).run(at(2025, 2, 1, 6), false).await.unwrap();
        let report = outcome.report().unwrap();

        assert_eq!(report.total_generated(), 0);
        assert_eq!(report.errors.len(), 2);
        assert!(report.failed_kinds.is_empty());
    }

    #[tokio::test]
    async fn test_store_timeout() {
        let store = Arc::new(InMemoryStore::new());
        store.stall(Duration::from_secs(60)).await;
        let runner = RecurrenceRunner::new(
            store,
            RunnerConfig {
                store_timeout: Duration::from_millis(50),
            },
        );

        let error = runner.run(at(2025, 2, 1, 6), false).await.unwrap_err();
        assert!(matches!(error, RecurrenceError::Timeout(_, _)));
    }

    #[tokio::test]
    async fn test_instances_generated_in_run_block_duplicates() {
        // Two copies of the same template row must still yield one instance
        let template = obligation_template("DCTF", 15);
        let store = Arc::new(InMemoryStore::with_records([
            Record::from(template.clone()),
            Record::from(template.clone()),
        ]));

        let outcome = runner(store.clone()).run(at(2025, 2, 1, 6), false).await.unwrap();
        let report = outcome.report().unwrap();

        assert_eq!(report.obligations_generated, 1);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_run_against_database() {
        let db = setup_db().await.unwrap();
        let store = Arc::new(SeaOrmStore::new(db));
        store.upsert(Record::from(tax_template("ISS", 10))).await.unwrap();
        store.upsert(Record::from(obligation_template("DCTF", 15))).await.unwrap();
        store.upsert(Record::from(installment_plan("Parcelamento", 1, 12))).await.unwrap();
        let runner = RecurrenceRunner::new(store.clone(), RunnerConfig::default());

        let outcome = runner.run(at(2025, 2, 1, 6), false).await.unwrap();
        let report = outcome.report().unwrap();
        assert_eq!(report.taxes_generated, 1);
        assert_eq!(report.obligations_generated, 1);
        assert_eq!(report.installments_generated, 1);
        assert!(report.is_clean());

        // Forcing again hits the unique indexes for taxes and obligations
        let forced = runner.run(at(2025, 2, 1, 7), true).await.unwrap();
        let report = forced.report().unwrap();
        assert_eq!(report.total_generated(), 0);
        assert_eq!(report.errors.len(), 2);

        assert_eq!(store.fetch_all(EntityKind::Tax).await.unwrap().len(), 2);
        assert_eq!(store.fetch_all(EntityKind::Obligation).await.unwrap().len(), 2);
    }
}
