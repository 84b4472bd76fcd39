use axum::extract::{Query, State};
use axum::Json;
use http::HeaderMap;
use std::sync::Arc;
use tracing::info;

use crate::config::security_config::authorize_scheduler_or_user;
use crate::error::ApiError;
use crate::models::dtos::{CronQuery, ErrorResponse, ThresholdRunSummary};
use crate::models::AppState;
use crate::services::threshold_service;

#[utoipa::path(
    post,
    path = "/api/cron/check-thresholds",
    params(("secret" = Option<String>, Query, description = "Scheduler secret (alternative to the Authorization header)")),
    responses(
        (status = 200, description = "Run summary", body = ThresholdRunSummary),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("cronSecret" = [])),
    tag = "Cron"
)]
pub async fn check_thresholds(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<CronQuery>,
) -> Result<Json<ThresholdRunSummary>, ApiError> {
    let scope = authorize_scheduler_or_user(&state.config, &headers, query.secret.as_deref())?;
    info!("Threshold check triggered, scope {:?}", scope);

    let summary = threshold_service::run(state, scope).await?;
    Ok(Json(summary))
}
