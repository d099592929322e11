use chrono::NaiveDate;
use common::{
    GenerationErrorDto, GenerationReportDto, RunStatus, TriggerRecurrenceRequest,
    TriggerRecurrenceResponse, UpcomingDueDateDto,
};
use recurrence::RecurrenceRunner;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};
use validator::Validate;

pub use common::ApiResponse;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Recurrence engine backed by the same database
    pub runner: RecurrenceRunner,
}

/// Query parameters for the due-date listing
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct DueDatesQuery {
    /// Reference date (YYYY-MM-DD), defaults to today
    pub reference_date: Option<NaiveDate>,
    /// Maximum number of entries to return
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<usize>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            success: false,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::recurrence::trigger_recurrence,
        crate::handlers::due_dates::get_due_dates,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            DueDatesQuery,
            RunStatus,
            TriggerRecurrenceRequest,
            TriggerRecurrenceResponse,
            GenerationReportDto,
            GenerationErrorDto,
            UpcomingDueDateDto,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "recurrence", description = "Recurring entity generation"),
        (name = "due-dates", description = "Upcoming due dates of tax, obligation and installment templates"),
    ),
    info(
        title = "duetrack API",
        description = "Due-date tracking for taxes, fiscal obligations and installment plans",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
