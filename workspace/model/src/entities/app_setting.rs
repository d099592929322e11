use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;

/// Key under which the recurrence engine stores the date of its last run.
pub const LAST_RECURRENCE_RUN: &str = "recurrence.last_run";

/// Small key-value table for application-wide markers.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "app_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub value: String,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
