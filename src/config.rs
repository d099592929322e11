use anyhow::Result;
use config::{Config, Environment};
use sea_orm::Database;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::schemas::AppState;

/// Prefix of the environment variables read into [`Settings`].
pub const ENV_PREFIX: &str = "DUETRACK";

/// Runtime settings, resolved from defaults and `DUETRACK_*` variables.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    /// Upper bound for a single store call made by the recurrence engine
    pub store_timeout_secs: u64,
    /// Seconds between two background recurrence runs
    pub scheduler_interval_secs: u64,
    pub scheduler_enabled: bool,
}

impl Settings {
    /// Loads `.env` and then resolves the settings from the process environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    fn from_env(environment: Environment) -> Result<Self> {
        let settings = Config::builder()
            .set_default("database_url", "sqlite://duetrack.db")?
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("store_timeout_secs", 10_i64)?
            .set_default("scheduler_interval_secs", 3600_i64)?
            .set_default("scheduler_enabled", true)?
            .add_source(environment)
            .build()?
            .try_deserialize::<Settings>()?;

        debug!("Resolved settings: {:?}", settings);
        Ok(settings)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    pub fn scheduler_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler_interval_secs)
    }
}

/// Connect to the database and build the shared application state
pub async fn initialize_app_state(settings: &Settings) -> Result<AppState> {
    info!("Connecting to database: {}", settings.database_url);
    let db = Database::connect(&settings.database_url).await?;

    let runner = recurrence::default_runner(db.clone(), settings.store_timeout());

    Ok(AppState { db, runner })
}
