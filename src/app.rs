use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::swagger_config::ApiDoc;
use crate::handlers::{
    check_thresholds::check_thresholds, health::health_check,
    monthly_reminder::monthly_reminder, monthly_sync::monthly_sync,
    reconcile_trials::reconcile_trials, sync_revenues::sync_revenues,
};
use crate::models::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // GET variants proxy to the same handlers so the jobs can be triggered
    // from a browser with ?secret=... during manual testing.
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health_check))
        .route(
            "/api/cron/check-thresholds",
            post(check_thresholds).get(check_thresholds),
        )
        .route(
            "/api/cron/sync-revenues",
            post(sync_revenues).get(sync_revenues),
        )
        .route(
            "/api/cron/monthly-sync",
            post(monthly_sync).get(monthly_sync),
        )
        .route("/api/cron/reconcile-trials", post(reconcile_trials))
        .route(
            "/api/cron/monthly-reminder",
            post(monthly_reminder).get(monthly_reminder),
        )
        .with_state(state)
}
