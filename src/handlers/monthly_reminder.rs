use axum::extract::{Query, State};
use axum::Json;
use http::HeaderMap;
use std::sync::Arc;
use tracing::info;

use crate::config::security_config::authorize_scheduler;
use crate::error::ApiError;
use crate::models::dtos::{CronQuery, ErrorResponse, ReminderRunSummary};
use crate::models::AppState;
use crate::services::reminder_service;

#[utoipa::path(
    post,
    path = "/api/cron/monthly-reminder",
    params(("secret" = Option<String>, Query, description = "Scheduler secret (alternative to the Authorization header)")),
    responses(
        (status = 200, description = "Run summary", body = ReminderRunSummary),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("cronSecret" = [])),
    tag = "Cron"
)]
pub async fn monthly_reminder(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<CronQuery>,
) -> Result<Json<ReminderRunSummary>, ApiError> {
    authorize_scheduler(&state.config, &headers, query.secret.as_deref())?;
    info!("Monthly reminder triggered");

    let summary = reminder_service::run(state).await?;
    Ok(Json(summary))
}
