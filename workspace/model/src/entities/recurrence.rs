//! Enums and JSON column types shared by every recurring entity table.

use chrono::NaiveDateTime;
use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How often a recurring entity produces a new instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(15))")]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceType {
    #[sea_orm(string_value = "monthly")]
    Monthly,
    #[sea_orm(string_value = "bimonthly")]
    Bimonthly,
    #[sea_orm(string_value = "quarterly")]
    Quarterly,
    #[sea_orm(string_value = "semiannual")]
    Semiannual,
    #[sea_orm(string_value = "annual")]
    Annual,
    /// Every `recurrence_interval` months.
    #[sea_orm(string_value = "custom")]
    Custom,
}

/// What to do with a due date that falls on Saturday or Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(15))")]
#[serde(rename_all = "snake_case")]
pub enum WeekendPolicy {
    /// Move forward to the following Monday.
    #[sea_orm(string_value = "postpone")]
    Postpone,
    /// Move back to the preceding Friday.
    #[sea_orm(string_value = "anticipate")]
    Anticipate,
    #[sea_orm(string_value = "keep")]
    Keep,
}

/// Lifecycle status of a tax, obligation or installment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(15))")]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "overdue")]
    Overdue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "urgent")]
    Urgent,
}

/// One line of an entity's audit trail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub action: String,
    pub description: String,
    pub timestamp: NaiveDateTime,
}

/// Audit trail, stored as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct History(pub Vec<HistoryEntry>);

impl History {
    pub fn push(&mut self, action: &str, description: impl Into<String>, timestamp: NaiveDateTime) {
        self.0.push(HistoryEntry {
            action: action.to_string(),
            description: description.into(),
            timestamp,
        });
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.0
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.0.last()
    }
}

/// Free-form labels, stored as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Tags(pub Vec<String>);
