use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::client;
use super::recurrence::{EntityStatus, History, Priority, RecurrenceType, Tags, WeekendPolicy};

/// A debt split into a fixed number of monthly payments (a tax payment plan).
///
/// One row tracks the whole plan: `current_installment` moves forward each
/// period instead of a new row being spawned per payment.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "installments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub client_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    /// 1-based position of the payment currently due.
    pub current_installment: i32,
    pub installment_count: i32,
    /// Due date of the first payment; later payments are offset from it by whole months.
    pub first_due_date: NaiveDate,
    pub due_day: i32,
    pub due_month: Option<i32>,
    pub weekend_policy: WeekendPolicy,
    pub recurrence_type: RecurrenceType,
    pub recurrence_interval: Option<i32>,
    pub recurrence_end_date: Option<NaiveDate>,
    pub auto_generate: bool,
    pub priority: Priority,
    pub assigned_to: Option<String>,
    /// Value of each payment.
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub amount: Option<Decimal>,
    pub notes: Option<String>,
    #[sea_orm(column_type = "Json")]
    pub tags: Tags,
    pub status: EntityStatus,
    pub completed_at: Option<NaiveDateTime>,
    pub completed_by: Option<String>,
    pub realization_date: Option<NaiveDate>,
    pub parent_installment_id: Option<Uuid>,
    /// Period the plan was last advanced for.
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
