use chrono::{DateTime, Datelike, Utc};
use diesel::prelude::*;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::clients::shopify::ShopifyOrder;
use crate::clients::stripe::ChargeSummary;
use crate::clients::StripeClient;
use crate::error::ApiError;
use crate::models::dtos::{MonthlySyncSummary, SyncRunSummary};
use crate::models::entities::{Integration, NewRevenue, NewSyncLog};
use crate::models::enums::{ActivityCategory, Provider};
use crate::models::AppState;
use crate::schema::{email_preferences, integrations, revenues, sync_logs, users};
use crate::services::cotisations;
use crate::services::sync_window::SyncWindow;

const TRAILING_SYNC_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncType {
    Cron,
    Manual,
    Monthly,
}

impl SyncType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncType::Cron => "cron",
            SyncType::Manual => "manual",
            SyncType::Monthly => "monthly",
        }
    }
}

/// Deterministic identifier preventing double-import of one provider
/// transaction, e.g. `stripe_ch_3NXa...`.
pub fn external_id(provider: Provider, raw_id: &str) -> String {
    format!("{}_{}", provider.as_str(), raw_id)
}

/// Shopify sends totals as decimal strings ("129.90").
pub fn parse_price_cents(price: &str) -> Result<i64, ApiError> {
    let value: f64 = price
        .trim()
        .parse()
        .map_err(|_| ApiError::Provider(format!("Unparseable order total: '{}'", price)))?;
    Ok((value * 100.0).round() as i64)
}

fn new_revenue(
    user_id: Uuid,
    created: DateTime<Utc>,
    amount_cents: i64,
    ext_id: String,
    metadata: serde_json::Value,
) -> NewRevenue {
    // Imported platform revenue is service activity in URSSAF terms.
    let category = ActivityCategory::Service;
    NewRevenue {
        user_id,
        year: created.year(),
        month: created.month() as i32,
        amount_cents,
        category: category.as_str().to_string(),
        external_id: Some(ext_id),
        cotisation_cents: cotisations::cotisation_cents(amount_cents, category),
        net_cents: cotisations::net_cents(amount_cents, category),
        metadata: Some(metadata),
    }
}

pub fn charge_to_revenue(user_id: Uuid, charge: &ChargeSummary) -> NewRevenue {
    new_revenue(
        user_id,
        charge.created,
        charge.amount_minor,
        external_id(Provider::Stripe, &charge.id),
        json!({
            "provider": "stripe",
            "currency": charge.currency,
            "description": charge.description,
            "account_ref": charge.account_ref,
        }),
    )
}

pub fn order_to_revenue(user_id: Uuid, order: &ShopifyOrder) -> Result<NewRevenue, ApiError> {
    Ok(new_revenue(
        user_id,
        order.created_at,
        parse_price_cents(&order.total_price)?,
        external_id(Provider::Shopify, &order.id.to_string()),
        json!({
            "provider": "shopify",
            "currency": order.currency,
            "order_number": order.order_number,
        }),
    ))
}

/// Inserts rows one by one; the unique index on (user_id, external_id) plus
/// DO NOTHING makes re-import of an already-seen transaction a no-op, so a
/// partially completed run self-heals on the next invocation.
pub fn insert_revenues(conn: &mut PgConnection, rows: &[NewRevenue]) -> Result<u32, ApiError> {
    let mut inserted = 0u32;
    for row in rows {
        inserted += diesel::insert_into(revenues::table)
            .values(row)
            .on_conflict((revenues::user_id, revenues::external_id))
            .do_nothing()
            .execute(conn)? as u32;
    }
    Ok(inserted)
}

fn write_sync_log(
    conn: &mut PgConnection,
    user_id: Uuid,
    provider: &str,
    sync_type: SyncType,
    status: &str,
    records_synced: i32,
    error_message: Option<String>,
    metadata: Option<serde_json::Value>,
) {
    let result = diesel::insert_into(sync_logs::table)
        .values(NewSyncLog {
            user_id,
            provider: provider.to_string(),
            sync_type: sync_type.as_str().to_string(),
            status: status.to_string(),
            records_synced,
            error_message,
            metadata,
        })
        .execute(conn);
    if let Err(e) = result {
        error!("Failed to write sync log for user {}: {}", user_id, e);
    }
}

fn touch_last_sync(conn: &mut PgConnection, integration_id: Uuid) {
    let result = diesel::update(integrations::table.find(integration_id))
        .set(integrations::last_sync_at.eq(Utc::now()))
        .execute(conn);
    if let Err(e) = result {
        warn!("Failed to update last_sync_at for {}: {}", integration_id, e);
    }
}

/// Pulls this integration's transactions for `window` and maps them to
/// insertable revenue rows.
async fn fetch_for_integration(
    state: &AppState,
    integration: &Integration,
    window: &SyncWindow,
) -> Result<Vec<NewRevenue>, ApiError> {
    let provider = Provider::parse(&integration.provider)
        .ok_or_else(|| ApiError::Provider(format!("Unknown provider: {}", integration.provider)))?;

    let token = state.config.token_cipher.decrypt(&integration.encrypted_token)?;

    match provider {
        Provider::Stripe => {
            let charges = StripeClient::new(&token)
                .list_succeeded_charges(window)
                .await?;
            Ok(charges
                .iter()
                .map(|c| charge_to_revenue(integration.user_id, c))
                .collect())
        }
        Provider::Shopify => {
            let orders = state
                .shopify
                .list_paid_orders(&integration.account_ref, &token, window)
                .await?;
            orders
                .iter()
                .map(|o| order_to_revenue(integration.user_id, o))
                .collect()
        }
    }
}

/// Syncs one integration end to end; returns how many new rows were created.
async fn sync_integration(
    state: &AppState,
    integration: &Integration,
    window: &SyncWindow,
    sync_type: SyncType,
) -> Result<u32, ApiError> {
    let rows = fetch_for_integration(state, integration, window).await?;
    let provider_total = rows.len();

    let conn = &mut state
        .db
        .get()
        .map_err(|e| ApiError::DatabaseConnection(e.to_string()))?;

    let synced = insert_revenues(conn, &rows)?;
    write_sync_log(
        conn,
        integration.user_id,
        &integration.provider,
        sync_type,
        "success",
        synced as i32,
        None,
        Some(json!({ "provider_total": provider_total })),
    );
    touch_last_sync(conn, integration.id);

    info!(
        "Synced integration {} ({}): {} of {} transactions were new",
        integration.id, integration.provider, synced, provider_total
    );
    Ok(synced)
}

fn active_integrations(state: &AppState) -> Result<Vec<Integration>, ApiError> {
    let conn = &mut state
        .db
        .get()
        .map_err(|e| ApiError::DatabaseConnection(e.to_string()))?;
    Ok(integrations::table
        .filter(integrations::is_active.eq(true))
        .load(conn)?)
}

fn record_integration_error(state: &AppState, integration: &Integration, sync_type: SyncType, e: &ApiError) {
    error!(
        "Sync failed for integration {} ({}): {}",
        integration.id, integration.provider, e
    );
    match &mut state.db.get() {
        Ok(conn) => write_sync_log(
            conn,
            integration.user_id,
            &integration.provider,
            sync_type,
            "error",
            0,
            Some(e.to_string()),
            None,
        ),
        Err(pool_err) => error!(
            "No connection to record the failed sync for integration {}: {}",
            integration.id, pool_err
        ),
    }
}

/// Ad-hoc sync over a trailing 30-day window, one transaction per revenue row.
pub async fn run(state: Arc<AppState>, sync_type: SyncType) -> Result<SyncRunSummary, ApiError> {
    let window = SyncWindow::trailing_days(Utc::now(), TRAILING_SYNC_DAYS);
    let targets = active_integrations(&state)?;

    let mut summary = SyncRunSummary::default();
    for integration in &targets {
        summary.integrations_processed += 1;
        match sync_integration(&state, integration, &window, sync_type).await {
            Ok(n) => summary.records_synced += n,
            Err(e) => {
                record_integration_error(&state, integration, sync_type, &e);
                summary.errors += 1;
            }
        }
    }

    if summary.errors > 0 && summary.errors == summary.integrations_processed {
        crate::services::ops_alert::notify_admin(
            &state,
            "Revenue sync: toutes les intégrations en erreur",
            &format!(
                "<p>{} intégration(s) traitée(s), toutes en échec. Voir les sync_logs.</p>",
                summary.integrations_processed
            ),
        )
        .await;
    }

    info!(
        "Revenue sync done: {} integrations, {} new records, {} errors",
        summary.integrations_processed, summary.records_synced, summary.errors
    );
    Ok(summary)
}

fn recap_enabled(conn: &mut PgConnection, user_id: Uuid) -> bool {
    email_preferences::table
        .find(user_id)
        .select(email_preferences::monthly_recap)
        .first::<bool>(conn)
        .optional()
        .unwrap_or(None)
        // No preference row means the user never opted out.
        .unwrap_or(true)
}

fn recap_email_html(total_cents: i64, year: i32, month: u32) -> String {
    format!(
        "<h2>Votre récapitulatif mensuel</h2>\
         <p>Chiffre d'affaires encaissé via vos intégrations en {:02}/{} : \
         <strong>{:.2} €</strong>.</p>\
         <p>Une ligne de revenu agrégée a été ajoutée à votre comptabilité.</p>",
        month,
        year,
        total_cents as f64 / 100.0
    )
}

/// Monthly sync over the previous calendar month. Instead of one row per
/// transaction, writes a single aggregated revenue row per user, then sends
/// the recap email unless the user opted out.
pub async fn run_monthly(state: Arc<AppState>) -> Result<MonthlySyncSummary, ApiError> {
    let (window, year, month) = SyncWindow::previous_month(Utc::now());
    let targets = active_integrations(&state)?;

    let mut by_user: HashMap<Uuid, Vec<Integration>> = HashMap::new();
    for integration in targets {
        by_user.entry(integration.user_id).or_default().push(integration);
    }

    let mut summary = MonthlySyncSummary::default();
    for (user_id, user_integrations) in by_user {
        summary.users_processed += 1;

        let mut total_cents = 0i64;
        let mut failed_fetches = 0u32;
        for integration in &user_integrations {
            match fetch_for_integration(&state, integration, &window).await {
                Ok(rows) => {
                    total_cents += rows.iter().map(|r| r.amount_cents).sum::<i64>();
                    match &mut state.db.get() {
                        Ok(conn) => {
                            write_sync_log(
                                conn,
                                user_id,
                                &integration.provider,
                                SyncType::Monthly,
                                "success",
                                rows.len() as i32,
                                None,
                                Some(json!({ "year": year, "month": month })),
                            );
                            touch_last_sync(conn, integration.id);
                        }
                        Err(pool_err) => error!(
                            "No connection to write the monthly sync log for user {}: {}",
                            user_id, pool_err
                        ),
                    }
                }
                Err(e) => {
                    record_integration_error(&state, integration, SyncType::Monthly, &e);
                    summary.errors += 1;
                    failed_fetches += 1;
                }
            }
        }

        if !ready_to_finalize(failed_fetches, total_cents) {
            if failed_fetches > 0 {
                warn!(
                    "Deferring the monthly aggregate for user {}: {} integration(s) failed this run",
                    user_id, failed_fetches
                );
            }
            continue;
        }

        match finalize_user_month(&state, user_id, total_cents, year, month).await {
            Ok((created, recap_sent)) => {
                if created {
                    summary.records_created += 1;
                }
                if recap_sent {
                    summary.recaps_sent += 1;
                }
            }
            Err(e) => {
                error!("Monthly aggregate failed for user {}: {}", user_id, e);
                summary.errors += 1;
            }
        }
    }

    info!(
        "Monthly sync done: {} users, {} aggregate records, {} recaps, {} errors",
        summary.users_processed, summary.records_created, summary.recaps_sent, summary.errors
    );
    Ok(summary)
}

/// The aggregate row can only ever be written once per (user, month), so it
/// must come from a complete picture: any failed fetch this run defers
/// aggregation to the next invocation instead of locking in a partial total.
fn ready_to_finalize(failed_fetches: u32, total_cents: i64) -> bool {
    failed_fetches == 0 && total_cents > 0
}

async fn finalize_user_month(
    state: &AppState,
    user_id: Uuid,
    total_cents: i64,
    year: i32,
    month: u32,
) -> Result<(bool, bool), ApiError> {
    let (created, email, wants_recap) = {
        let conn = &mut state
            .db
            .get()
            .map_err(|e| ApiError::DatabaseConnection(e.to_string()))?;

        let category = ActivityCategory::Service;
        let created = diesel::insert_into(revenues::table)
            .values(NewRevenue {
                user_id,
                year,
                month: month as i32,
                amount_cents: total_cents,
                category: category.as_str().to_string(),
                external_id: Some(format!("monthly_{}_{}", year, month)),
                cotisation_cents: cotisations::cotisation_cents(total_cents, category),
                net_cents: cotisations::net_cents(total_cents, category),
                metadata: Some(json!({ "source": "monthly_sync" })),
            })
            .on_conflict((revenues::user_id, revenues::external_id))
            .do_nothing()
            .execute(conn)?
            > 0;

        let email = users::table
            .find(user_id)
            .select(users::email)
            .first::<String>(conn)
            .optional()?;

        (created, email, recap_enabled(conn, user_id))
    };

    if !created {
        info!("Monthly record for user {} {}/{} already exists", user_id, month, year);
        return Ok((false, false));
    }

    let mut recap_sent = false;
    if wants_recap {
        if let Some(email) = email.filter(|e| !e.is_empty()) {
            state
                .email
                .send(
                    &email,
                    "Votre récapitulatif mensuel",
                    &recap_email_html(total_cents, year, month),
                )
                .await?;
            recap_sent = true;
        }
    }

    Ok((true, recap_sent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn charge(id: &str, amount_minor: i64) -> ChargeSummary {
        ChargeSummary {
            id: id.to_string(),
            amount_minor,
            currency: "EUR".to_string(),
            description: Some("Abonnement".to_string()),
            created: Utc.with_ymd_and_hms(2025, 4, 12, 10, 0, 0).unwrap(),
            account_ref: None,
        }
    }

    #[test]
    fn external_id_prefixes_the_provider() {
        assert_eq!(external_id(Provider::Stripe, "ch_123"), "stripe_ch_123");
        assert_eq!(external_id(Provider::Shopify, "456"), "shopify_456");
    }

    #[test]
    fn charge_amount_is_kept_in_minor_units() {
        let user = Uuid::new_v4();
        let row = charge_to_revenue(user, &charge("ch_1", 12_990));
        assert_eq!(row.amount_cents, 12_990);
        assert_eq!(row.year, 2025);
        assert_eq!(row.month, 4);
        assert_eq!(row.external_id.as_deref(), Some("stripe_ch_1"));
        assert_eq!(row.cotisation_cents + row.net_cents, row.amount_cents);
    }

    #[test]
    fn shopify_decimal_totals_become_cents() {
        assert_eq!(parse_price_cents("129.90").unwrap(), 12_990);
        assert_eq!(parse_price_cents(" 15 ").unwrap(), 1_500);
        assert!(parse_price_cents("12,90").is_err());
    }

    #[test]
    fn order_mapping_carries_the_order_number() {
        let order = ShopifyOrder {
            id: 987654,
            total_price: "42.00".to_string(),
            currency: "EUR".to_string(),
            order_number: 1042,
            created_at: Utc.with_ymd_and_hms(2025, 3, 2, 8, 30, 0).unwrap(),
        };
        let row = order_to_revenue(Uuid::new_v4(), &order).unwrap();
        assert_eq!(row.amount_cents, 4_200);
        assert_eq!(row.external_id.as_deref(), Some("shopify_987654"));
        assert_eq!(row.metadata.unwrap()["order_number"], 1042);
    }

    #[test]
    fn partial_fetches_defer_the_monthly_aggregate() {
        assert!(!ready_to_finalize(1, 50_000));
        assert!(!ready_to_finalize(0, 0));
        assert!(ready_to_finalize(0, 50_000));
    }

    #[test]
    fn sync_type_labels_match_the_audit_rows() {
        assert_eq!(SyncType::Cron.as_str(), "cron");
        assert_eq!(SyncType::Manual.as_str(), "manual");
        assert_eq!(SyncType::Monthly.as_str(), "monthly");
    }
}
