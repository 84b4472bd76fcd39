use axum::extract::{Query, State};
use axum::Json;
use http::HeaderMap;
use std::sync::Arc;
use tracing::info;

use crate::config::security_config::authorize_scheduler;
use crate::error::ApiError;
use crate::models::dtos::{CronQuery, ErrorResponse, MonthlySyncSummary};
use crate::models::AppState;
use crate::services::import_service;

#[utoipa::path(
    post,
    path = "/api/cron/monthly-sync",
    params(("secret" = Option<String>, Query, description = "Scheduler secret (alternative to the Authorization header)")),
    responses(
        (status = 200, description = "Run summary", body = MonthlySyncSummary),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("cronSecret" = [])),
    tag = "Cron"
)]
pub async fn monthly_sync(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<CronQuery>,
) -> Result<Json<MonthlySyncSummary>, ApiError> {
    authorize_scheduler(&state.config, &headers, query.secret.as_deref())?;
    info!("Monthly sync triggered");

    let summary = import_service::run_monthly(state).await?;
    Ok(Json(summary))
}
