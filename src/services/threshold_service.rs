use chrono::{Datelike, Utc};
use diesel::prelude::*;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::security_config::CronScope;
use crate::error::ApiError;
use crate::models::dtos::{ThresholdAlert, ThresholdRunSummary};
use crate::models::entities::{NewThresholdAlert, User};
use crate::models::AppState;
use crate::schema::{revenues, threshold_alerts, users};
use crate::services::cotisations::{SERVICES_CEILING_CENTS, VENTE_CEILING_CENTS};

pub const SERVICES_ACTIVITY_LABEL: &str = "Services/Activités libérales";
pub const VENTE_ACTIVITY_LABEL: &str = "Vente de marchandises";

/// Short bucket keys persisted in `threshold_alerts`.
const SERVICES_BUCKET: &str = "services";
const VENTE_BUCKET: &str = "vente";

/// Sums current-year revenue lines into the two regulatory buckets and
/// reports every exceeded ceiling. Lines are `(category, amount_cents)`;
/// amounts in the alerts are euros.
pub fn compute_alerts(lines: &[(String, i64)]) -> Vec<ThresholdAlert> {
    let mut services_cents = 0i64;
    let mut vente_cents = 0i64;

    for (category, amount_cents) in lines {
        match category.as_str() {
            "service" | "liberale" | "prestation" => services_cents += amount_cents,
            "vente" => vente_cents += amount_cents,
            other => warn!("Ignoring revenue line with unknown category '{}'", other),
        }
    }

    let mut alerts = Vec::new();
    if services_cents > SERVICES_CEILING_CENTS {
        alerts.push(ThresholdAlert {
            activity: SERVICES_ACTIVITY_LABEL.to_string(),
            ca: services_cents as f64 / 100.0,
            threshold: SERVICES_CEILING_CENTS as f64 / 100.0,
        });
    }
    if vente_cents > VENTE_CEILING_CENTS {
        alerts.push(ThresholdAlert {
            activity: VENTE_ACTIVITY_LABEL.to_string(),
            ca: vente_cents as f64 / 100.0,
            threshold: VENTE_CEILING_CENTS as f64 / 100.0,
        });
    }
    alerts
}

/// Alerts whose bucket has no guard row this year. A bucket whose email
/// failed last run has no row and shows up as pending again; two overlapping
/// runs can race into a duplicate email, never into a lost one.
fn pending_alerts<'a>(
    alerts: &'a [ThresholdAlert],
    already_alerted: &[String],
) -> Vec<&'a ThresholdAlert> {
    alerts
        .iter()
        .filter(|a| !already_alerted.iter().any(|b| b == bucket_key(&a.activity)))
        .collect()
}

fn bucket_key(activity: &str) -> &'static str {
    if activity == VENTE_ACTIVITY_LABEL {
        VENTE_BUCKET
    } else {
        SERVICES_BUCKET
    }
}

fn alert_email_html(alerts: &[ThresholdAlert], year: i32) -> String {
    let mut rows = String::new();
    for a in alerts {
        rows.push_str(&format!(
            "<li><strong>{}</strong> : {:.2} € encaissés, plafond de {:.0} € dépassé</li>",
            a.activity, a.ca, a.threshold
        ));
    }
    format!(
        "<h2>Seuil de chiffre d'affaires dépassé</h2>\
         <p>Votre chiffre d'affaires {} dépasse un plafond du régime micro-entreprise :</p>\
         <ul>{}</ul>\
         <p>Au-delà de ces plafonds, le régime simplifié ne s'applique plus. \
         Pensez à vérifier votre situation avec votre conseiller.</p>",
        year, rows
    )
}

/// Runs the threshold check for the scoped user set. Per-user failures are
/// counted and never abort the batch.
pub async fn run(state: Arc<AppState>, scope: CronScope) -> Result<ThresholdRunSummary, ApiError> {
    let year = Utc::now().year();
    let targets: Vec<User> = {
        let conn = &mut state
            .db
            .get()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))?;
        match scope {
            CronScope::AllUsers => users::table.load(conn)?,
            CronScope::User(id) => users::table.filter(users::id.eq(id)).load(conn)?,
        }
    };

    let mut summary = ThresholdRunSummary::default();
    for user in targets {
        summary.checked += 1;
        match check_user(&state, &user, year).await {
            Ok(true) => summary.alerts_sent += 1,
            Ok(false) => {}
            Err(e) => {
                error!("Threshold check failed for user {}: {}", user.id, e);
                summary.errors += 1;
            }
        }
    }

    info!(
        "Threshold run done: {} checked, {} alerts sent, {} errors",
        summary.checked, summary.alerts_sent, summary.errors
    );
    Ok(summary)
}

/// Returns true when an alert email was sent.
async fn check_user(state: &AppState, user: &User, year: i32) -> Result<bool, ApiError> {
    if user.email.is_empty() {
        info!("User {} has no email address, skipping", user.id);
        return Ok(false);
    }

    let conn = &mut state
        .db
        .get()
        .map_err(|e| ApiError::DatabaseConnection(e.to_string()))?;

    let lines: Vec<(String, i64)> = revenues::table
        .filter(revenues::user_id.eq(user.id))
        .filter(revenues::year.eq(year))
        .select((revenues::category, revenues::amount_cents))
        .load(conn)?;

    let alerts = compute_alerts(&lines);
    if alerts.is_empty() {
        return Ok(false);
    }

    // One alert per user, bucket and calendar year. The guard row is only
    // recorded after the email actually went out: a transient send failure
    // leaves the bucket eligible for the next scheduled run.
    let already_alerted: Vec<String> = threshold_alerts::table
        .filter(threshold_alerts::user_id.eq(user.id))
        .filter(threshold_alerts::year.eq(year))
        .select(threshold_alerts::bucket)
        .load(conn)?;

    let pending = pending_alerts(&alerts, &already_alerted);
    if pending.is_empty() {
        info!("User {} already alerted for {}, not resending", user.id, year);
        return Ok(false);
    }

    state
        .email
        .send(
            &user.email,
            "⚠️ Seuil de chiffre d'affaires dépassé",
            &alert_email_html(&alerts, year),
        )
        .await?;

    for alert in &pending {
        diesel::insert_into(threshold_alerts::table)
            .values(NewThresholdAlert {
                user_id: user.id,
                year,
                bucket: bucket_key(&alert.activity).to_string(),
            })
            .on_conflict((
                threshold_alerts::user_id,
                threshold_alerts::year,
                threshold_alerts::bucket,
            ))
            .do_nothing()
            .execute(conn)?;
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(category: &str, euros: i64) -> (String, i64) {
        (category.to_string(), euros * 100)
    }

    #[test]
    fn under_both_ceilings_yields_no_alert() {
        let lines = vec![line("service", 77_700), line("vente", 188_700)];
        assert!(compute_alerts(&lines).is_empty());
    }

    #[test]
    fn services_over_ceiling_yields_one_alert_with_sum_and_ceiling() {
        let lines = vec![line("service", 50_000), line("liberale", 30_000)];
        let alerts = compute_alerts(&lines);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].activity, SERVICES_ACTIVITY_LABEL);
        assert_eq!(alerts[0].ca, 80_000.0);
        assert_eq!(alerts[0].threshold, 77_700.0);
    }

    #[test]
    fn legacy_prestation_lines_count_toward_the_services_bucket() {
        let lines = vec![line("prestation", 40_000), line("service", 40_000)];
        let alerts = compute_alerts(&lines);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].ca, 80_000.0);
    }

    #[test]
    fn both_ceilings_exceeded_yields_two_alerts() {
        let lines = vec![line("liberale", 100_000), line("vente", 200_000)];
        let alerts = compute_alerts(&lines);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[1].activity, VENTE_ACTIVITY_LABEL);
        assert_eq!(alerts[1].threshold, 188_700.0);
    }

    #[test]
    fn unknown_categories_are_ignored() {
        let lines = vec![line("crypto", 999_999)];
        assert!(compute_alerts(&lines).is_empty());
    }

    #[test]
    fn bucket_without_a_guard_row_stays_pending() {
        // First detection, or a previous run whose email send failed before
        // the guard row was recorded: the alert must go out on this run.
        let alerts = vec![ThresholdAlert {
            activity: SERVICES_ACTIVITY_LABEL.to_string(),
            ca: 80_000.0,
            threshold: 77_700.0,
        }];
        assert_eq!(pending_alerts(&alerts, &[]).len(), 1);
    }

    #[test]
    fn recorded_bucket_is_not_resent() {
        let alerts = vec![
            ThresholdAlert {
                activity: SERVICES_ACTIVITY_LABEL.to_string(),
                ca: 80_000.0,
                threshold: 77_700.0,
            },
            ThresholdAlert {
                activity: VENTE_ACTIVITY_LABEL.to_string(),
                ca: 190_000.0,
                threshold: 188_700.0,
            },
        ];
        let already = vec!["services".to_string()];
        let pending = pending_alerts(&alerts, &already);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].activity, VENTE_ACTIVITY_LABEL);
    }

    #[test]
    fn email_lists_every_exceeded_ceiling() {
        let alerts = vec![
            ThresholdAlert {
                activity: SERVICES_ACTIVITY_LABEL.to_string(),
                ca: 80_000.0,
                threshold: 77_700.0,
            },
            ThresholdAlert {
                activity: VENTE_ACTIVITY_LABEL.to_string(),
                ca: 190_000.0,
                threshold: 188_700.0,
            },
        ];
        let html = alert_email_html(&alerts, 2025);
        assert!(html.contains("Services/Activités libérales"));
        assert!(html.contains("Vente de marchandises"));
        assert!(html.contains("80000.00"));
    }
}
