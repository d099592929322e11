use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How a recurrence run ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every kind was fetched and every eligible entity was generated.
    Completed,
    /// The run went through but some entities (or a whole kind) failed.
    Partial,
    /// The last-run marker already holds today's date.
    AlreadyRanToday,
    /// Today is not the first day of the month and the run was not forced.
    NotFirstOfMonth,
}

/// Request body for triggering a recurrence run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TriggerRecurrenceRequest {
    /// Bypass the once-a-day and first-of-month gates as well as the duplicate check.
    pub force: Option<bool>,
}

/// A single failure collected during a run.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GenerationErrorDto {
    /// Entity kind (`tax`, `obligation` or `installment`)
    pub kind: String,
    /// Template id, absent when the whole kind failed to load
    pub entity_id: Option<String>,
    /// Template name, absent when the whole kind failed to load
    pub entity_name: Option<String>,
    /// Human readable error
    pub message: String,
}

/// Aggregate result of a recurrence run.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GenerationReportDto {
    pub status: RunStatus,
    /// Target period (`YYYY-MM`), absent when the run was skipped
    pub period: Option<String>,
    pub taxes_generated: usize,
    pub obligations_generated: usize,
    pub installments_generated: usize,
    pub errors: Vec<GenerationErrorDto>,
}

impl GenerationReportDto {
    /// Total number of generated (or advanced) entities across all kinds.
    pub fn total_generated(&self) -> usize {
        self.taxes_generated + self.obligations_generated + self.installments_generated
    }
}

/// Response of the trigger endpoint.
///
/// Either `{ success: true, result }` or `{ success: false, error }`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TriggerRecurrenceResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<GenerationReportDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TriggerRecurrenceResponse {
    pub fn ok(result: GenerationReportDto) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// The next due date of one template entity.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UpcomingDueDateDto {
    pub kind: String,
    pub entity_id: String,
    pub name: String,
    pub client_id: Option<String>,
    /// Weekend-adjusted due date
    pub due_date: NaiveDate,
    /// Period key of the due date (`YYYY-MM`)
    pub period: String,
}
