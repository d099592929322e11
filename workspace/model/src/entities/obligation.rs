use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::entity::prelude::*;

use super::recurrence::{EntityStatus, History, Priority, RecurrenceType, Tags, WeekendPolicy};
use super::{client, tax};

/// An accessory obligation: a filing, declaration or report owed to an authority.
/// It may be linked to the tax it supports.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "obligations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub client_id: Option<Uuid>,
    pub tax_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub due_day: i32,
    pub due_month: Option<i32>,
    pub weekend_policy: WeekendPolicy,
    pub recurrence_type: RecurrenceType,
    pub recurrence_interval: Option<i32>,
    pub recurrence_end_date: Option<NaiveDate>,
    pub auto_generate: bool,
    pub priority: Priority,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
    #[sea_orm(column_type = "Json")]
    pub tags: Tags,
    pub status: EntityStatus,
    pub completed_at: Option<NaiveDateTime>,
    pub completed_by: Option<String>,
    pub realization_date: Option<NaiveDate>,
    pub parent_obligation_id: Option<Uuid>,
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
    #[sea_orm(
        belongs_to = "tax::Entity",
        from = "Column::TaxId",
        to = "tax::Column::Id",
        on_delete = "SetNull"
    )]
    Tax,
}

impl Related<client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<tax::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tax.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
