//! Background task that triggers a non-forced recurrence run on an interval.
//!
//! The runner's own gates keep this cheap: outside the first day of the month
//! every tick only records the check.

use chrono::{Local, NaiveDateTime};
use recurrence::{RecurrenceRunner, RunOutcome};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Spawns the scheduler loop. The first tick fires immediately.
pub fn spawn_scheduler(runner: RecurrenceRunner, interval: Duration) -> JoinHandle<()> {
    info!("Starting recurrence scheduler (interval: {:?})", interval);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            tick(&runner, Local::now().naive_local()).await;
        }
    })
}

/// One scheduled run. Failures are logged and the loop carries on.
pub async fn tick(runner: &RecurrenceRunner, now: NaiveDateTime) -> Option<RunOutcome> {
    match runner.run(now, false).await {
        Ok(outcome) => {
            match &outcome {
                RunOutcome::AlreadyRanToday => debug!("Scheduled run skipped, already ran today"),
                RunOutcome::NotFirstOfMonth => debug!("Scheduled run skipped, not the first of the month"),
                RunOutcome::Completed(report) if report.is_clean() => {
                    info!("Scheduled run generated {} entities for {}", report.total_generated(), report.period)
                }
                RunOutcome::Completed(report) => warn!(
                    "Scheduled run for {} finished with {} errors",
                    report.period,
                    report.errors.len()
                ),
            }
            Some(outcome)
        }
        Err(e) => {
            error!("Scheduled recurrence run failed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use recurrence::{EntityKind, InMemoryStore, RecurrenceStore, RunnerConfig};
    use std::sync::Arc;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(6, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_tick_records_check_outside_first_of_month() {
        let store = Arc::new(InMemoryStore::new());
        let runner = RecurrenceRunner::new(store.clone(), RunnerConfig::default());

        let outcome = tick(&runner, at(2025, 3, 14)).await;
        assert_eq!(outcome, Some(RunOutcome::NotFirstOfMonth));
        assert_eq!(
            store.last_run().await.unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 14)
        );

        let outcome = tick(&runner, at(2025, 3, 14)).await;
        assert_eq!(outcome, Some(RunOutcome::AlreadyRanToday));
    }

    #[tokio::test]
    async fn test_tick_reports_failed_kinds() {
        let store = Arc::new(InMemoryStore::new());
        store.fail_fetch(EntityKind::Installment).await;
        let runner = RecurrenceRunner::new(store.clone(), RunnerConfig::default());

        let outcome = tick(&runner, at(2025, 4, 1)).await.unwrap();
        let report = outcome.report().unwrap();
        assert_eq!(report.failed_kinds, vec![EntityKind::Installment]);
        assert_eq!(store.last_run().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_spawned_scheduler_runs_first_tick() {
        let store = Arc::new(InMemoryStore::new());
        let runner = RecurrenceRunner::new(store.clone(), RunnerConfig::default());

        let handle = spawn_scheduler(runner, Duration::from_secs(3600));
        for _ in 0..50 {
            if store.last_run().await.unwrap().is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        // The first tick fires at once and always leaves a marker behind
        assert!(store.last_run().await.unwrap().is_some());
    }
}
