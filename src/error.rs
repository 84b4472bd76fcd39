use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::r2d2;
use http::StatusCode;
use std::fmt;

use crate::models::dtos::ErrorResponse;

#[derive(Debug)]
pub enum ApiError {
    Database(diesel::result::Error),
    DatabaseConnection(String),
    Auth(String),
    Token(String),
    /// An upstream provider (Stripe, Shopify) rejected the call or returned garbage.
    Provider(String),
    /// The provider could not be reached at all. Kept distinct from
    /// `Provider` so batch jobs can leave state untouched and retry later.
    ProviderUnreachable(String),
    Email(String),
    Crypto(String),
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Database(e) => write!(f, "Database error: {}", e),
            ApiError::DatabaseConnection(e) => write!(f, "Database connection error: {}", e),
            ApiError::Auth(e) => write!(f, "{}", e),
            ApiError::Token(e) => write!(f, "Token error: {}", e),
            ApiError::Provider(e) => write!(f, "Provider error: {}", e),
            ApiError::ProviderUnreachable(e) => write!(f, "Provider unreachable: {}", e),
            ApiError::Email(e) => write!(f, "Email error: {}", e),
            ApiError::Crypto(e) => write!(f, "Crypto error: {}", e),
            ApiError::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<r2d2::Error> for ApiError {
    fn from(err: r2d2::Error) -> Self {
        ApiError::DatabaseConnection(err.to_string())
    }
}

impl From<diesel::result::Error> for ApiError {
    fn from(err: diesel::result::Error) -> Self {
        ApiError::Database(err)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            ApiError::ProviderUnreachable(err.to_string())
        } else {
            ApiError::Provider(err.to_string())
        }
    }
}

impl From<stripe::StripeError> for ApiError {
    fn from(err: stripe::StripeError) -> Self {
        match &err {
            stripe::StripeError::Stripe(_) => ApiError::Provider(err.to_string()),
            _ => ApiError::ProviderUnreachable(err.to_string()),
        }
    }
}

impl From<ApiError> for (StatusCode, String) {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Database(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", e),
            ),
            ApiError::DatabaseConnection(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database connection error: {}", e),
            ),
            ApiError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Token(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Provider(msg) => (
                StatusCode::BAD_GATEWAY,
                format!("Provider error: {}", msg),
            ),
            ApiError::ProviderUnreachable(msg) => (
                StatusCode::BAD_GATEWAY,
                format!("Provider unreachable: {}", msg),
            ),
            ApiError::Email(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Email error: {}", msg),
            ),
            ApiError::Crypto(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Crypto error: {}", msg),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal error: {}", msg),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message): (StatusCode, String) = self.into();
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_error_maps_to_401_with_bare_message() {
        let (status, message): (StatusCode, String) =
            ApiError::Auth("Non autorisé".to_string()).into();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message, "Non autorisé");
    }

    #[test]
    fn unreachable_provider_is_not_a_provider_rejection() {
        let (status, message): (StatusCode, String) =
            ApiError::ProviderUnreachable("connect timeout".to_string()).into();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(message.contains("unreachable"));
    }
}
