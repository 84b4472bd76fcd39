use crate::handlers::{
    check_thresholds::__path_check_thresholds, health::__path_health_check,
    monthly_reminder::__path_monthly_reminder, monthly_sync::__path_monthly_sync,
    reconcile_trials::__path_reconcile_trials, sync_revenues::__path_sync_revenues,
};
use crate::models::dtos::*;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        check_thresholds,
        sync_revenues,
        monthly_sync,
        reconcile_trials,
        monthly_reminder
    ),
    components(schemas(
        ErrorResponse,
        ThresholdAlert,
        ThresholdRunSummary,
        SyncRunSummary,
        MonthlySyncSummary,
        TrialRunSummary,
        ReminderRunSummary
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Cron", description = "Scheduler-triggered batch jobs"),
        (name = "Health", description = "Liveness probe")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "cronSecret".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some("Scheduler shared secret or user JWT"))
                        .build(),
                ),
            );
        }
    }
}
