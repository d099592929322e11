//! Fixtures shared by the engine tests.

use chrono::{NaiveDate, NaiveDateTime};
use migration::{Migrator, MigratorTrait};
use model::entities::recurrence::{EntityStatus, History, Priority, RecurrenceType, Tags, WeekendPolicy};
use model::entities::{installment, obligation, tax};
use rust_decimal::Decimal;
use sea_orm::prelude::Uuid;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};

pub async fn setup_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Enable foreign keys
    db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

    Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, hour: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(hour, 0, 0).unwrap()
}

/// Fixtures are created on this instant unless a test says otherwise.
pub fn created_at() -> NaiveDateTime {
    at(2025, 1, 5, 9)
}

/// A monthly, auto-generated tax template.
pub fn tax_template(name: &str, due_day: i32) -> tax::Model {
    tax::Model {
        id: Uuid::new_v4(),
        client_id: None,
        name: name.to_string(),
        description: Some(format!("{name} collection")),
        due_day,
        due_month: None,
        weekend_policy: WeekendPolicy::Postpone,
        recurrence_type: RecurrenceType::Monthly,
        recurrence_interval: None,
        recurrence_end_date: None,
        auto_generate: true,
        priority: Priority::High,
        assigned_to: Some("fiscal".to_string()),
        amount: Some(Decimal::new(125_050, 2)),
        notes: None,
        tags: Tags(vec!["municipal".to_string()]),
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

/// A monthly, auto-generated obligation template.
pub fn obligation_template(name: &str, due_day: i32) -> obligation::Model {
    obligation::Model {
        id: Uuid::new_v4(),
        client_id: None,
        tax_id: None,
        name: name.to_string(),
        description: None,
        due_day,
        due_month: None,
        weekend_policy: WeekendPolicy::Postpone,
        recurrence_type: RecurrenceType::Monthly,
        recurrence_interval: None,
        recurrence_end_date: None,
        auto_generate: true,
        priority: Priority::Medium,
        assigned_to: None,
        notes: None,
        tags: Tags::default(),
        status: EntityStatus::Pending,
        completed_at: None,
        completed_by: None,
        realization_date: None,
        parent_obligation_id: None,
        generated_for: None,
        created_at: created_at(),
        history: History::default(),
    }
}

/// A plan paid on the 20th, first payment 2025-01-20, at `current` of `count`.
pub fn installment_plan(name: &str, current: i32, count: i32) -> installment::Model {
    installment::Model {
        id: Uuid::new_v4(),
        client_id: None,
        name: name.to_string(),
        description: None,
        current_installment: current,
        installment_count: count,
        first_due_date: date(2025, 1, 20),
        due_day: 20,
        due_month: None,
        weekend_policy: WeekendPolicy::Postpone,
        recurrence_type: RecurrenceType::Monthly,
        recurrence_interval: None,
        recurrence_end_date: None,
        auto_generate: true,
        priority: Priority::Medium,
        assigned_to: None,
        amount: Some(Decimal::new(48_000, 2)),
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
