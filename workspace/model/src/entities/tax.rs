use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::client;
use super::recurrence::{EntityStatus, History, Priority, RecurrenceType, Tags, WeekendPolicy};

/// A tax the client has to collect or pay on a recurring schedule.
///
/// Rows with `parent_tax_id = NULL` are templates created by users; the rest were
/// generated by the recurrence engine for the period stored in `generated_for`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "taxes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub client_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    /// Day of month the tax is due (1-31).
    pub due_day: i32,
    /// Fixed calendar month for annual or quarterly taxes (1-12).
    pub due_month: Option<i32>,
    pub weekend_policy: WeekendPolicy,
    pub recurrence_type: RecurrenceType,
    /// Months between occurrences for `custom` recurrences (1-12).
    pub recurrence_interval: Option<i32>,
    /// No instances are generated once this date has passed.
    pub recurrence_end_date: Option<NaiveDate>,
    pub auto_generate: bool,
    pub priority: Priority,
    pub assigned_to: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub amount: Option<Decimal>,
    pub notes: Option<String>,
    #[sea_orm(column_type = "Json")]
    pub tags: Tags,
    pub status: EntityStatus,
    pub completed_at: Option<NaiveDateTime>,
    pub completed_by: Option<String>,
    pub realization_date: Option<NaiveDate>,
    /// The template this row was generated from.
    pub parent_tax_id: Option<Uuid>,
    /// Period key (`YYYY-MM`) this row was generated for.
    pub generated_for: Option<String>,
    pub created_at: NaiveDateTime,
    #[sea_orm(column_type = "Json")]
    pub history: History,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "client::Entity",
        from = "Column::ClientId",
        to = "client::Column::Id",
        on_delete = "Cascade"
    )]
    Client,
}

impl Related<client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
