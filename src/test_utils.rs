#[cfg(test)]
pub mod test_utils {
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use chrono::{NaiveDate, NaiveDateTime};
    use migration::{Migrator, MigratorTrait};
    use model::entities::recurrence::{EntityStatus, History, Priority, RecurrenceType, Tags, WeekendPolicy};
    use model::entities::{installment, tax};
    use recurrence::{Record, RecurrenceRunner, RecurrenceStore, SeaOrmStore};
    use rust_decimal::Decimal;
    use sea_orm::DatabaseConnection;
    use sea_orm::Database;
    use std::time::Duration;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;
    use uuid::Uuid;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing, with the runner backed by the test database
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;
        let runner = recurrence::default_runner(db.clone(), Duration::from_secs(5));
        AppState { db, runner }
    }

    fn created_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 5)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    /// A monthly, auto-generated tax template due on `due_day`
    pub fn tax_template(name: &str, due_day: i32) -> tax::Model {
        tax::Model {
            id: Uuid::new_v4(),
            client_id: None,
            name: name.to_string(),
            description: None,
            due_day,
            due_month: None,
            weekend_policy: WeekendPolicy::Postpone,
            recurrence_type: RecurrenceType::Monthly,
            recurrence_interval: None,
            recurrence_end_date: None,
            auto_generate: true,
            priority: Priority::High,
            assigned_to: None,
            amount: Some(Decimal::new(99_90, 2)),
            notes: None,
            tags: Tags::default(),
            status: EntityStatus::Pending,
            completed_at: None,
            completed_by: None,
            realization_date: None,
            parent_tax_id: None,
            generated_for: None,
            created_at: created_at(),
            history: History::default(),
        }
    }

    /// A monthly plan paid on the 20th, first payment 2025-01-20
    pub fn installment_plan(name: &str, current: i32, count: i32) -> installment::Model {
        installment::Model {
            id: Uuid::new_v4(),
            client_id: None,
            name: name.to_string(),
            description: None,
            current_installment: current,
            installment_count: count,
            first_due_date: NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            due_day: 20,
            due_month: None,
            weekend_policy: WeekendPolicy::Postpone,
            recurrence_type: RecurrenceType::Monthly,
            recurrence_interval: None,
            recurrence_end_date: None,
            auto_generate: true,
            priority: Priority::Medium,
            assigned_to: None,
            amount: None,
            notes: None,
            tags: Tags::default(),
            status: EntityStatus::Pending,
            completed_at: None,
            completed_by: None,
            realization_date: None,
            parent_installment_id: None,
            generated_for: None,
            created_at: created_at(),
            history: History::default(),
        }
    }

    /// Store `records` through the same store the runner uses
    pub async fn seed(db: &DatabaseConnection, records: impl IntoIterator<Item = Record>) {
        let store = SeaOrmStore::new(db.clone());
        for record in records {
            store.upsert(record).await.expect("Failed to seed record");
        }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is read from RUST_LOG and defaults to WARN.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| level.parse::<Level>().ok())
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        setup_test_app_with_state(setup_test_app_state().await)
    }

    /// Create axum app for testing around a prepared state
    pub fn setup_test_app_with_state(state: AppState) -> Router {
        let _ = init_test_tracing();
        create_router(state)
    }

    /// Replace the runner of a prepared state, e.g. with one over an in-memory store
    pub fn with_runner(state: AppState, runner: RecurrenceRunner) -> AppState {
        AppState { runner, ..state }
    }
}
