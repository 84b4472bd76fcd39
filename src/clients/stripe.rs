use chrono::{DateTime, TimeZone, Utc};
use stripe::{
    Charge, ChargeStatus, Client, ListCharges, RangeBounds, RangeQuery, Subscription,
    SubscriptionId, SubscriptionStatus,
};
use tracing::info;

use crate::error::ApiError;
use crate::services::sync_window::SyncWindow;

const CHARGE_PAGE_LIMIT: u64 = 100;

/// One successful charge, reduced to the fields the importer consumes.
#[derive(Debug, Clone)]
pub struct ChargeSummary {
    pub id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub description: Option<String>,
    pub created: DateTime<Utc>,
    pub account_ref: Option<String>,
}

/// Answer from probing a subscription's live state. A transport failure is
/// surfaced as `ApiError::ProviderUnreachable`, never folded into `Inactive`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionProbe {
    Active,
    Inactive(String),
}

/// Thin wrapper over `async-stripe`, constructed per secret key: the platform
/// key for billing probes, a user's connected-account key for charge import.
pub struct StripeClient {
    client: Client,
}

impl StripeClient {
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: Client::new(secret_key),
        }
    }

    /// Lists succeeded charges created inside `window`, newest first as
    /// returned by Stripe.
    pub async fn list_succeeded_charges(
        &self,
        window: &SyncWindow,
    ) -> Result<Vec<ChargeSummary>, ApiError> {
        let params = ListCharges {
            created: Some(RangeQuery::Bounds(RangeBounds {
                gte: Some(window.start.timestamp()),
                lt: Some(window.end.timestamp()),
                ..Default::default()
            })),
            limit: Some(CHARGE_PAGE_LIMIT),
            ..Default::default()
        };

        let page = Charge::list(&self.client, &params).await?;
        info!(
            "Stripe returned {} charges ({} succeeded)",
            page.data.len(),
            page.data
                .iter()
                .filter(|c| c.status == ChargeStatus::Succeeded)
                .count()
        );

        Ok(page
            .data
            .into_iter()
            .filter(|c| c.status == ChargeStatus::Succeeded)
            .map(|c| ChargeSummary {
                id: c.id.to_string(),
                amount_minor: c.amount,
                currency: c.currency.to_string().to_uppercase(),
                description: c.description,
                created: Utc
                    .timestamp_opt(c.created, 0)
                    .single()
                    .unwrap_or_else(Utc::now),
                account_ref: c.on_behalf_of.map(|a| a.id().to_string()),
            })
            .collect())
    }

    /// Fetches a subscription's live status.
    pub async fn subscription_status(
        &self,
        subscription_id: &str,
    ) -> Result<SubscriptionProbe, ApiError> {
        let id: SubscriptionId = subscription_id
            .parse()
            .map_err(|_| ApiError::Provider(format!("Invalid subscription id: {}", subscription_id)))?;

        match Subscription::retrieve(&self.client, &id, &[]).await {
            Ok(sub) if sub.status == SubscriptionStatus::Active => Ok(SubscriptionProbe::Active),
            Ok(sub) => Ok(SubscriptionProbe::Inactive(sub.status.to_string())),
            // A definitive "no such subscription" is an inactive answer, not
            // an outage.
            Err(stripe::StripeError::Stripe(e)) if e.http_status == 404 => {
                Ok(SubscriptionProbe::Inactive("not_found".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
