//! Application state for studio-server

use aws_sdk_sesv2::Client as SesClient;
use sqlx::PgPool;

use crate::auth::RateLimiter;
use crate::config::Config;
use crate::db::BoxError;
use crate::email::Mailer;
use crate::stripe::StripeClient;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// SES-backed transactional mailer
    pub mailer: Mailer,
    /// Stripe REST client (checkout + webhook verification)
    pub stripe: StripeClient,
    /// JWT secret for admin sessions
    pub jwt_secret: String,
    /// Back-office login email (lowercase)
    pub admin_email: String,
    /// Argon2 PHC string of the admin password
    pub admin_password_hash: String,
    /// Rate limiter for login and public write routes
    pub rate_limiter: RateLimiter,
    /// Public site origin, no trailing slash
    pub public_base_url: String,
    /// Lowercase ISO currency code
    pub currency: String,
    pub gift_card_validity_days: i64,
    pub challenge_validity_days: i64,
}

impl AppState {
    /// Connect the pool, run migrations and build the AWS clients
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        let ses = if let Ok(ses_region) = std::env::var("SES_REGION") {
            let ses_config = aws_config
                .to_builder()
                .region(aws_config::Region::new(ses_region))
                .build();
            SesClient::new(&ses_config)
        } else {
            SesClient::new(&aws_config)
        };

        let mailer = Mailer::new(
            ses,
            config.ses_from_email.clone(),
            config.studio_notify_email.clone(),
            config.public_base_url.clone(),
            config.currency.clone(),
        );

        let stripe = StripeClient::new(
            config.stripe_secret_key.clone(),
            config.stripe_webhook_secret.clone(),
        );

        Ok(Self {
            pool,
            mailer,
            stripe,
            jwt_secret: config.jwt_secret.clone(),
            admin_email: config.admin_email.clone(),
            admin_password_hash: config.admin_password_hash.clone(),
            rate_limiter: RateLimiter::new(),
            public_base_url: config.public_base_url.clone(),
            currency: config.currency.clone(),
            gift_card_validity_days: config.gift_card_validity_days,
            challenge_validity_days: config.challenge_validity_days,
        })
    }

    /// Stripe redirect targets on the public site
    pub fn checkout_urls(&self, path: &str) -> (String, String) {
        (
            format!("{}{path}?status=success&session_id={{CHECKOUT_SESSION_ID}}", self.public_base_url),
            format!("{}{path}?status=cancelled", self.public_base_url),
        )
    }
}
