use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::schema::{
    email_preferences, integrations, revenues, sync_logs, threshold_alerts, user_profiles, users,
};

#[derive(Queryable, Insertable, Selectable, Identifiable, Debug)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Debug)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(table_name = revenues)]
pub struct Revenue {
    pub id: Uuid,
    pub user_id: Uuid,
    pub year: i32,
    pub month: i32,
    pub amount_cents: i64,
    pub category: String,
    pub external_id: Option<String>,
    pub cotisation_cents: i64,
    pub net_cents: i64,
    pub metadata: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = revenues)]
pub struct NewRevenue {
    pub user_id: Uuid,
    pub year: i32,
    pub month: i32,
    pub amount_cents: i64,
    pub category: String,
    pub external_id: Option<String>,
    pub cotisation_cents: i64,
    pub net_cents: i64,
    pub metadata: Option<JsonValue>,
}

#[derive(Queryable, Selectable, Identifiable, Debug)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(table_name = integrations)]
pub struct Integration {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: String,
    pub encrypted_token: String,
    pub account_ref: String,
    pub is_active: bool,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Debug)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(table_name = user_profiles)]
#[diesel(primary_key(user_id))]
pub struct UserProfile {
    pub user_id: Uuid,
    pub plan: String,
    pub plan_status: String,
    pub stripe_subscription_id: Option<String>,
    pub trial_plan: Option<String>,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = sync_logs)]
pub struct NewSyncLog {
    pub user_id: Uuid,
    pub provider: String,
    pub sync_type: String,
    pub status: String,
    pub records_synced: i32,
    pub error_message: Option<String>,
    pub metadata: Option<JsonValue>,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(table_name = email_preferences)]
pub struct EmailPreference {
    pub user_id: Uuid,
    pub monthly_recap: bool,
    pub monthly_reminder: bool,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = threshold_alerts)]
pub struct NewThresholdAlert {
    pub user_id: Uuid,
    pub year: i32,
    pub bucket: String,
}
