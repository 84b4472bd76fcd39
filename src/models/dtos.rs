use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

/// One exceeded regulatory ceiling, as rendered in the alert email.
/// Amounts are in euros, matching what the user declares to URSSAF.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct ThresholdAlert {
    pub activity: String,
    pub ca: f64,
    pub threshold: f64,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Default)]
pub struct ThresholdRunSummary {
    pub checked: u32,
    pub alerts_sent: u32,
    pub errors: u32,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Default)]
pub struct SyncRunSummary {
    pub integrations_processed: u32,
    pub records_synced: u32,
    pub errors: u32,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Default)]
pub struct MonthlySyncSummary {
    pub users_processed: u32,
    pub records_created: u32,
    pub recaps_sent: u32,
    pub errors: u32,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Default)]
pub struct TrialRunSummary {
    pub checked: u32,
    pub promoted: u32,
    pub demoted: u32,
    pub errors: u32,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Default)]
pub struct ReminderRunSummary {
    pub sent: u32,
    pub errors: u32,
}

#[derive(Deserialize, ToSchema, Debug, Default)]
pub struct CronQuery {
    /// Scheduler secret, accepted as an alternative to the Authorization header
    /// for manual browser-based triggering.
    pub secret: Option<String>,
}
