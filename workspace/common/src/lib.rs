//! Common transport-layer types shared between the HTTP API and the CLI.
//! These structs are the serialized shape of recurrence runs and due-date
//! listings, so both surfaces print exactly the same JSON.

mod recurrence;

pub use recurrence::{
    GenerationErrorDto, GenerationReportDto, RunStatus, TriggerRecurrenceRequest,
    TriggerRecurrenceResponse, UpcomingDueDateDto,
};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic API response wrapper used by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success flag
    pub success: bool,
}
