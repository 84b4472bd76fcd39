use secrecy::SecretString;
use std::env;

use crate::config::plans::PlanCatalog;
use crate::services::token_cipher::TokenCipher;

/// Process-wide configuration, read once in `main` and carried by `AppState`.
#[derive(Clone)]
pub struct AppConfig {
    pub cron_secret: SecretString,
    pub jwt_secret: SecretString,
    pub stripe_secret_key: SecretString,
    pub resend_api_key: SecretString,
    pub mail_from: String,
    /// Recipient for fire-and-forget operational alerts; alerting is off
    /// when unset.
    pub admin_email: Option<String>,
    pub app_url: String,
    pub token_cipher: TokenCipher,
    pub plans: PlanCatalog,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, eyre::Error> {
        let cron_secret = require("CRON_SECRET")?;
        let jwt_secret = require("JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            return Err(eyre::eyre!("JWT_SECRET must be at least 32 characters long"));
        }

        let token_cipher = TokenCipher::from_base64_key(&require("TOKEN_ENCRYPTION_KEY")?)
            .map_err(|e| eyre::eyre!("Invalid TOKEN_ENCRYPTION_KEY: {}", e))?;

        Ok(Self {
            cron_secret: SecretString::new(cron_secret),
            jwt_secret: SecretString::new(jwt_secret),
            stripe_secret_key: SecretString::new(require("STRIPE_SECRET_KEY")?),
            resend_api_key: SecretString::new(require("RESEND_API_KEY")?),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "MicroCompta <notifications@microcompta.fr>".to_string()),
            admin_email: env::var("ADMIN_EMAIL").ok(),
            app_url: env::var("APP_URL").unwrap_or_else(|_| "http://localhost:8080".to_string()),
            token_cipher,
            plans: PlanCatalog::new(
                env::var("STRIPE_PRICE_PRO").ok(),
                env::var("STRIPE_PRICE_PREMIUM").ok(),
            ),
        })
    }
}

fn require(name: &str) -> Result<String, eyre::Error> {
    env::var(name).map_err(|_| eyre::eyre!("{} environment variable must be set", name))
}
