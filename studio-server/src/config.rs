//! Server configuration

use crate::db::BoxError;

/// Server configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP listen port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT secret for admin sessions
    pub jwt_secret: String,
    /// Back-office login
    pub admin_email: String,
    /// Argon2 PHC string of the admin password
    pub admin_password_hash: String,
    /// SES sender email address
    pub ses_from_email: String,
    /// Studio inbox receiving booking notifications
    pub studio_notify_email: String,
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,
    /// Public site origin, used in checkout redirects and email links
    pub public_base_url: String,
    /// ISO currency code for payments (lowercase, as Stripe expects)
    pub currency: String,
    /// Days a purchased gift card stays valid
    pub gift_card_validity_days: i64,
    /// Days a photo challenge invitation stays open
    pub challenge_validity_days: i64,
    /// Allowed CORS origins; empty allows any origin
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: Self::parse_or("HTTP_PORT", 8080),
            environment: environment.clone(),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            admin_email: std::env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@localhost".into())
                .trim()
                .to_lowercase(),
            admin_password_hash: Self::require_secret("ADMIN_PASSWORD_HASH", &environment)?,
            ses_from_email: std::env::var("SES_FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@localhost".into()),
            studio_notify_email: std::env::var("STUDIO_NOTIFY_EMAIL")
                .unwrap_or_else(|_| "studio@localhost".into()),
            stripe_secret_key: Self::require_secret("STRIPE_SECRET_KEY", &environment)?,
            stripe_webhook_secret: Self::require_secret("STRIPE_WEBHOOK_SECRET", &environment)?,
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into())
                .trim_end_matches('/')
                .to_string(),
            currency: std::env::var("CURRENCY")
                .unwrap_or_else(|_| "pln".into())
                .to_lowercase(),
            gift_card_validity_days: Self::parse_or("GIFT_CARD_VALIDITY_DAYS", 365),
            challenge_validity_days: Self::parse_or("CHALLENGE_VALIDITY_DAYS", 14),
            cors_allowed_origins: parse_origins(&std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default()),
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_split() {
        assert_eq!(
            parse_origins(" https://studio.pl/, https://admin.studio.pl ,,"),
            vec!["https://studio.pl", "https://admin.studio.pl"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn secrets_get_dev_placeholder() {
        let val = Config::require_secret("STUDIO_TEST_SECRET_THAT_IS_NEVER_SET", "development").unwrap();
        assert_eq!(val, "dev-STUDIO_TEST_SECRET_THAT_IS_NEVER_SET-not-for-production");
    }

    #[test]
    fn secrets_required_outside_development() {
        let err = Config::require_secret("STUDIO_TEST_SECRET_THAT_IS_NEVER_SET", "production").unwrap_err();
        assert!(err.to_string().contains("must be set"));
    }
}
