use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;
use tracing::info;

use crate::error::ApiError;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Transactional mail via the Resend HTTP API.
#[derive(Clone)]
pub struct EmailClient {
    http: Client,
    api_key: SecretString,
    from: String,
}

impl EmailClient {
    pub fn new(api_key: SecretString, from: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            from,
        }
    }

    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(RESEND_API_URL)
            .bearer_auth(self.api_key.expose_secret())
            .json(&SendRequest {
                from: &self.from,
                to: [to],
                subject,
                html,
            })
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| ApiError::Email(format!("Resend request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Email(format!(
                "Resend API error: status {}, body {}",
                status, body
            )));
        }

        info!("Email sent to {}: {}", to, subject);
        Ok(())
    }
}
