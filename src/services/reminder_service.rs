use chrono::{Datelike, Utc};
use diesel::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::dtos::ReminderRunSummary;
use crate::models::entities::User;
use crate::models::AppState;
use crate::schema::{email_preferences, users};

fn reminder_email_html(month: u32, year: i32) -> String {
    format!(
        "<h2>Pensez à votre déclaration URSSAF</h2>\
         <p>N'oubliez pas de déclarer votre chiffre d'affaires de {:02}/{} \
         avant la fin du mois sur autoentrepreneur.urssaf.fr.</p>\
         <p>Votre tableau de bord reprend les montants à déclarer, \
         cotisations déduites.</p>",
        month, year
    )
}

/// Sends the monthly URSSAF declaration reminder to every user who has not
/// opted out (a missing preference row counts as opted in).
pub async fn run(state: Arc<AppState>) -> Result<ReminderRunSummary, ApiError> {
    let (targets, reminder_prefs): (Vec<User>, HashMap<Uuid, bool>) = {
        let conn = &mut state
            .db
            .get()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))?;

        let targets = users::table.load::<User>(conn)?;
        let prefs: Vec<(Uuid, bool)> = email_preferences::table
            .select((email_preferences::user_id, email_preferences::monthly_reminder))
            .load(conn)?;
        (targets, prefs.into_iter().collect())
    };

    let now = Utc::now();
    let html = reminder_email_html(now.month(), now.year());

    let mut summary = ReminderRunSummary::default();
    for user in &targets {
        if user.email.is_empty() || !reminder_prefs.get(&user.id).copied().unwrap_or(true) {
            continue;
        }
        match state
            .email
            .send(&user.email, "📋 Rappel : déclaration URSSAF", &html)
            .await
        {
            Ok(()) => summary.sent += 1,
            Err(e) => {
                error!("Reminder email failed for user {}: {}", user.id, e);
                summary.errors += 1;
            }
        }
    }

    info!(
        "Reminder run done: {} sent, {} errors",
        summary.sent, summary.errors
    );
    Ok(summary)
}
