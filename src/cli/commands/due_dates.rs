use anyhow::Result;
use chrono::{Local, NaiveDate};
use common::UpcomingDueDateDto;
use tracing::info;

use crate::config::{initialize_app_state, Settings};

pub async fn list_due_dates(settings: &Settings, reference: Option<NaiveDate>) -> Result<()> {
    let reference = reference.unwrap_or_else(|| Local::now().date_naive());
    info!("Listing due dates from {}", reference);

    let state = initialize_app_state(settings).await?;
    let upcoming: Vec<UpcomingDueDateDto> = state
        .runner
        .upcoming(reference)
        .await?
        .iter()
        .map(UpcomingDueDateDto::from)
        .collect();

    println!("{}", serde_json::to_string_pretty(&upcoming)?);
    Ok(())
}
