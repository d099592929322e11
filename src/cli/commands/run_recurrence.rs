use anyhow::{bail, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use common::{GenerationReportDto, TriggerRecurrenceResponse};
use recurrence::RecurrenceRunner;
use tracing::{debug, error, info};

use crate::config::{initialize_app_state, Settings};

pub async fn run_recurrence(settings: &Settings, force: bool, date: Option<NaiveDate>) -> Result<()> {
    info!("Running recurrence generation");
    let state = initialize_app_state(settings).await?;

    let now = match date {
        Some(date) => date.and_time(Local::now().time()),
        None => Local::now().naive_local(),
    };

    let response = execute(&state.runner, now, force).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.success {
        bail!(response.error.unwrap_or_default());
    }
    Ok(())
}

/// Runs the engine once and shapes the outcome the way the HTTP trigger does.
pub async fn execute(runner: &RecurrenceRunner, now: NaiveDateTime, force: bool) -> TriggerRecurrenceResponse {
    debug!("Recurrence run at {} (force: {})", now, force);

    match runner.run(now, force).await {
        Ok(outcome) if outcome.is_total_failure() => {
            error!("Every entity kind failed to load");
            TriggerRecurrenceResponse::failed("Failed to load taxes, obligations and installments")
        }
        Ok(outcome) => TriggerRecurrenceResponse::ok(GenerationReportDto::from(&outcome)),
        Err(e) => {
            error!("Recurrence run failed: {}", e);
            TriggerRecurrenceResponse::failed(e.to_string())
        }
    }
}
