use axum::extract::{Query, State};
use axum::Json;
use http::HeaderMap;
use std::sync::Arc;
use tracing::info;

use crate::config::security_config::authorize_scheduler;
use crate::error::ApiError;
use crate::models::dtos::{CronQuery, ErrorResponse, SyncRunSummary};
use crate::models::AppState;
use crate::services::import_service::{self, SyncType};

#[utoipa::path(
    post,
    path = "/api/cron/sync-revenues",
    params(("secret" = Option<String>, Query, description = "Scheduler secret (alternative to the Authorization header)")),
    responses(
        (status = 200, description = "Run summary", body = SyncRunSummary),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("cronSecret" = [])),
    tag = "Cron"
)]
pub async fn sync_revenues(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<CronQuery>,
) -> Result<Json<SyncRunSummary>, ApiError> {
    authorize_scheduler(&state.config, &headers, query.secret.as_deref())?;

    // Query-parameter triggers are humans poking the endpoint by hand.
    let sync_type = if query.secret.is_some() {
        SyncType::Manual
    } else {
        SyncType::Cron
    };
    info!("Revenue sync triggered ({})", sync_type.as_str());

    let summary = import_service::run(state, sync_type).await?;
    Ok(Json(summary))
}
