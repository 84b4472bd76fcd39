use chrono::Utc;
use diesel::prelude::*;
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::clients::stripe::SubscriptionProbe;
use crate::clients::StripeClient;
use crate::error::ApiError;
use crate::models::dtos::TrialRunSummary;
use crate::models::entities::UserProfile;
use crate::models::enums::{PlanId, PlanStatus};
use crate::models::AppState;
use crate::schema::user_profiles;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialOutcome {
    Promoted,
    Demoted,
}

/// Decides what a stale trialing profile becomes. `None` means the profile
/// never recorded a subscription id, which can only be a dead trial.
pub fn decide(probe: Option<&SubscriptionProbe>) -> TrialOutcome {
    match probe {
        Some(SubscriptionProbe::Active) => TrialOutcome::Promoted,
        Some(SubscriptionProbe::Inactive(_)) | None => TrialOutcome::Demoted,
    }
}

fn promote(conn: &mut PgConnection, user_id: Uuid, target: PlanId) -> Result<(), ApiError> {
    diesel::update(user_profiles::table.find(user_id))
        .set((
            user_profiles::plan.eq(target.as_str()),
            user_profiles::plan_status.eq(PlanStatus::Active.as_str()),
            user_profiles::trial_plan.eq(None::<String>),
            user_profiles::trial_ends_at.eq(None::<chrono::DateTime<Utc>>),
            user_profiles::updated_at.eq(Utc::now()),
        ))
        .execute(conn)?;
    Ok(())
}

fn demote(conn: &mut PgConnection, user_id: Uuid) -> Result<(), ApiError> {
    diesel::update(user_profiles::table.find(user_id))
        .set((
            user_profiles::plan.eq(PlanId::Free.as_str()),
            user_profiles::plan_status.eq(PlanStatus::Canceled.as_str()),
            user_profiles::trial_plan.eq(None::<String>),
            user_profiles::trial_ends_at.eq(None::<chrono::DateTime<Utc>>),
            user_profiles::updated_at.eq(Utc::now()),
        ))
        .execute(conn)?;
    Ok(())
}

/// Nightly safety net for profiles stuck in `trialing` after their expiry,
/// for the cases where the webhook-driven update never fired. A profile whose
/// live subscription cannot be fetched is left untouched and retried on the
/// next run; only a definitive provider answer moves it.
pub async fn run(state: Arc<AppState>) -> Result<TrialRunSummary, ApiError> {
    let now = Utc::now();
    let stale: Vec<UserProfile> = {
        let conn = &mut state
            .db
            .get()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))?;
        user_profiles::table
            .filter(user_profiles::plan_status.eq(PlanStatus::Trialing.as_str()))
            .filter(user_profiles::trial_ends_at.lt(now))
            .load(conn)?
    };

    let stripe = StripeClient::new(state.config.stripe_secret_key.expose_secret());

    let mut summary = TrialRunSummary::default();
    for profile in &stale {
        summary.checked += 1;
        match reconcile_profile(&state, &stripe, profile).await {
            Ok(TrialOutcome::Promoted) => summary.promoted += 1,
            Ok(TrialOutcome::Demoted) => summary.demoted += 1,
            Err(e) => {
                error!("Trial reconciliation failed for user {}: {}", profile.user_id, e);
                summary.errors += 1;
            }
        }
    }

    if summary.errors > 0 {
        crate::services::ops_alert::notify_admin(
            &state,
            "Trial reconciliation: erreurs pendant le filet de sécurité",
            &format!(
                "<p>{} profil(s) en erreur sur {} vérifiés ; ils seront retentés demain.</p>",
                summary.errors, summary.checked
            ),
        )
        .await;
    }

    info!(
        "Trial reconciliation done: {} checked, {} promoted, {} demoted, {} errors",
        summary.checked, summary.promoted, summary.demoted, summary.errors
    );
    Ok(summary)
}

async fn reconcile_profile(
    state: &AppState,
    stripe: &StripeClient,
    profile: &UserProfile,
) -> Result<TrialOutcome, ApiError> {
    let probe = match profile.stripe_subscription_id.as_deref() {
        Some(subscription_id) => Some(stripe.subscription_status(subscription_id).await?),
        None => {
            warn!(
                "Trialing profile {} has no subscription id, demoting",
                profile.user_id
            );
            None
        }
    };

    let outcome = decide(probe.as_ref());
    let conn = &mut state
        .db
        .get()
        .map_err(|e| ApiError::DatabaseConnection(e.to_string()))?;

    match outcome {
        TrialOutcome::Promoted => {
            let target = state
                .config
                .plans
                .promotion_target(profile.trial_plan.as_deref());
            promote(conn, profile.user_id, target)?;
            info!("Promoted user {} to {}", profile.user_id, target.as_str());
        }
        TrialOutcome::Demoted => {
            demote(conn, profile.user_id)?;
            info!("Demoted user {} to free", profile.user_id);
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_subscription_promotes() {
        assert_eq!(decide(Some(&SubscriptionProbe::Active)), TrialOutcome::Promoted);
    }

    #[test]
    fn inactive_subscription_demotes() {
        let probe = SubscriptionProbe::Inactive("canceled".to_string());
        assert_eq!(decide(Some(&probe)), TrialOutcome::Demoted);
    }

    #[test]
    fn missing_subscription_id_demotes() {
        assert_eq!(decide(None), TrialOutcome::Demoted);
    }
}
