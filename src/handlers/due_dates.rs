use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::Local;
use common::UpcomingDueDateDto;
use tracing::{debug, error, info, instrument, trace};

use crate::schemas::{ApiResponse, AppState, DueDatesQuery, ErrorResponse};

/// List upcoming due dates
///
/// Returns the next due date, on or after the reference date, of every tax and
/// obligation template and the current payment of every open installment plan.
#[utoipa::path(
    get,
    path = "/api/v1/due-dates",
    tag = "due-dates",
    params(DueDatesQuery),
    responses(
        (status = 200, description = "Due dates retrieved successfully", body = ApiResponse<Vec<UpcomingDueDateDto>>),
        (status = 400, description = "Invalid query parameters"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_due_dates(
    Valid(Query(query)): Valid<Query<DueDatesQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UpcomingDueDateDto>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_due_dates function");

    let reference = query
        .reference_date
        .unwrap_or_else(|| Local::now().date_naive());
    debug!("Listing due dates from {} (limit: {:?})", reference, query.limit);

    match state.runner.upcoming(reference).await {
        Ok(upcoming) => {
            let limit = query.limit.unwrap_or(upcoming.len());
            let data: Vec<UpcomingDueDateDto> = upcoming
                .iter()
                .take(limit)
                .map(UpcomingDueDateDto::from)
                .collect();
            info!("Retrieved {} upcoming due dates", data.len());

            Ok(Json(ApiResponse {
                data,
                message: "Due dates retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(e) => {
            error!("Failed to list due dates: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to list due dates", "DATABASE_ERROR")),
            ))
        }
    }
}
