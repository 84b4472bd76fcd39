use axum::extract::{Query, State};
use axum::Json;
use http::HeaderMap;
use std::sync::Arc;
use tracing::info;

use crate::config::security_config::authorize_scheduler;
use crate::error::ApiError;
use crate::models::dtos::{CronQuery, ErrorResponse, TrialRunSummary};
use crate::models::AppState;
use crate::services::trial_service;

#[utoipa::path(
    post,
    path = "/api/cron/reconcile-trials",
    params(("secret" = Option<String>, Query, description = "Scheduler secret (alternative to the Authorization header)")),
    responses(
        (status = 200, description = "Run summary", body = TrialRunSummary),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("cronSecret" = [])),
    tag = "Cron"
)]
pub async fn reconcile_trials(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<CronQuery>,
) -> Result<Json<TrialRunSummary>, ApiError> {
    authorize_scheduler(&state.config, &headers, query.secret.as_deref())?;
    info!("Trial reconciliation triggered");

    let summary = trial_service::run(state).await?;
    Ok(Json(summary))
}
