use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Local;
use common::{GenerationReportDto, TriggerRecurrenceRequest, TriggerRecurrenceResponse};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::schemas::{AppState, ErrorResponse};

/// Trigger a recurrence run
///
/// Generates this month's instance of every eligible tax and obligation template and
/// advances eligible installment plans. Without `force` the run only happens once a
/// day, on the first day of the month.
#[utoipa::path(
    post,
    path = "/api/v1/recurrence/run",
    tag = "recurrence",
    request_body = TriggerRecurrenceRequest,
    responses(
        (status = 200, description = "Run finished, possibly with per-entity errors", body = TriggerRecurrenceResponse),
        (status = 500, description = "No entity kind could be loaded", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn trigger_recurrence(
    State(state): State<AppState>,
    Json(request): Json<TriggerRecurrenceRequest>,
) -> Result<Json<TriggerRecurrenceResponse>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering trigger_recurrence function");

    let force = request.force.unwrap_or(false);
    let now = Local::now().naive_local();
    debug!("Triggering recurrence run at {} (force: {})", now, force);

    match state.runner.run(now, force).await {
        Ok(outcome) if outcome.is_total_failure() => {
            error!("Recurrence run failed to load every entity kind");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(
                    "Failed to load taxes, obligations and installments",
                    "RECURRENCE_FAILED",
                )),
            ))
        }
        Ok(outcome) => {
            let report = GenerationReportDto::from(&outcome);
            if report.errors.is_empty() {
                info!("Recurrence run finished with status {:?}", report.status);
            } else {
                warn!("Recurrence run finished with {} errors", report.errors.len());
            }
            Ok(Json(TriggerRecurrenceResponse::ok(report)))
        }
        Err(e) => {
            error!("Recurrence run failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string(), "RECURRENCE_ERROR")),
            ))
        }
    }
}
