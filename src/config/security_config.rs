use http::HeaderMap;
use jsonwebtoken::{decode, DecodingKey, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::config::app_config::AppConfig;
use crate::error::ApiError;

pub const UNAUTHORIZED_MESSAGE: &str = "Non autorisé";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub exp: usize,  // expiration time
    pub iat: usize,  // issued at
}

/// Who a trigger endpoint is acting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CronScope {
    /// Scheduler-triggered: process every user.
    AllUsers,
    /// End-user-triggered: process only the authenticated user.
    User(Uuid),
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn unauthorized() -> ApiError {
    ApiError::Auth(UNAUTHORIZED_MESSAGE.to_string())
}

/// Validates the shared scheduler secret, taken from the `Authorization`
/// header or a `secret` query parameter. Runs before any database access.
pub fn authorize_scheduler(
    config: &AppConfig,
    headers: &HeaderMap,
    query_secret: Option<&str>,
) -> Result<(), ApiError> {
    let presented = bearer_token(headers).or(query_secret);
    match presented {
        Some(s) if s == config.cron_secret.expose_secret() => Ok(()),
        _ => {
            warn!("Scheduler trigger rejected: bad or missing secret");
            Err(unauthorized())
        }
    }
}

/// Like [`authorize_scheduler`] but also accepts an end-user JWT, scoping the
/// run to that user.
pub fn authorize_scheduler_or_user(
    config: &AppConfig,
    headers: &HeaderMap,
    query_secret: Option<&str>,
) -> Result<CronScope, ApiError> {
    if authorize_scheduler(config, headers, query_secret).is_ok() {
        return Ok(CronScope::AllUsers);
    }

    let token = bearer_token(headers).ok_or_else(unauthorized)?;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        warn!("JWT validation failed: {}", e);
        unauthorized()
    })?;

    let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| unauthorized())?;
    Ok(CronScope::User(user_id))
}
