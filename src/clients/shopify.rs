use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

use crate::error::ApiError;
use crate::services::sync_window::SyncWindow;

const API_VERSION: &str = "2024-01";
const ORDER_PAGE_LIMIT: u32 = 250;

#[derive(Debug, Clone, Deserialize)]
pub struct ShopifyOrder {
    pub id: u64,
    pub total_price: String,
    pub currency: String,
    pub order_number: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct OrdersResponse {
    orders: Vec<ShopifyOrder>,
}

#[derive(Clone)]
pub struct ShopifyClient {
    http: Client,
}

impl Default for ShopifyClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ShopifyClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    /// Lists paid orders created inside `window` for one shop. `shop_domain`
    /// is the `*.myshopify.com` host stored on the integration row.
    pub async fn list_paid_orders(
        &self,
        shop_domain: &str,
        access_token: &str,
        window: &SyncWindow,
    ) -> Result<Vec<ShopifyOrder>, ApiError> {
        let url = format!(
            "https://{}/admin/api/{}/orders.json",
            shop_domain, API_VERSION
        );

        let resp = self
            .http
            .get(&url)
            .header("X-Shopify-Access-Token", access_token)
            .query(&[
                ("status", "any".to_string()),
                ("financial_status", "paid".to_string()),
                ("created_at_min", window.start.to_rfc3339()),
                ("created_at_max", window.end.to_rfc3339()),
                ("limit", ORDER_PAGE_LIMIT.to_string()),
            ])
            .timeout(Duration::from_secs(15))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Provider(format!(
                "Shopify API error for {}: status {}, body {}",
                shop_domain, status, body
            )));
        }

        let body = resp
            .json::<OrdersResponse>()
            .await
            .map_err(|e| ApiError::Provider(format!("Invalid Shopify response: {}", e)))?;

        info!(
            "Shopify returned {} paid orders for {}",
            body.orders.len(),
            shop_domain
        );
        Ok(body.orders)
    }
}
