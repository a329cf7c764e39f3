use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sqlx::PgPool;

use crate::{
    ApiConfig, card::cache::TagPageCache, config::Environment, site::SiteInfo,
    user::email::EmailService,
};

#[derive(Clone)]
pub struct ApiState {
    pub pool: PgPool,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub bcrypt_cost: u32,
    pub password_reset_expiry_hours: i64,
    pub frontend_url: String,
    pub cookie_key: Key,
    pub environment: Environment,
    /// Menu and titles, built once at start-up and never mutated.
    pub site: Arc<SiteInfo>,
    pub tag_page_cache: TagPageCache,
    pub email_service: Option<EmailService>,
}

/// The subset of the state the [`crate::auth::AuthUser`] extractor needs.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
}

impl ApiState {
    pub fn new(config: ApiConfig, pool: PgPool) -> anyhow::Result<Self> {
        let cookie_key = Key::try_from(config.cookie_secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid COOKIE_SECRET: {e}"))?;

        // Initialize email service if SMTP is configured
        let email_service = if let (
            Some(host),
            Some(username),
            Some(password),
            Some(from_email),
            Some(from_name),
        ) = (
            config.smtp_host.as_ref(),
            config.smtp_username.as_ref(),
            config.smtp_password.as_ref(),
            config.smtp_from_email.as_ref(),
            config.smtp_from_name.as_ref(),
        ) {
            match EmailService::new(
                host,
                username,
                password,
                from_email,
                from_name,
                &config.frontend_url,
            ) {
                Ok(service) => Some(service),
                Err(e) => {
                    tracing::error!("Failed to initialize email service: {e}");
                    None
                }
            }
        } else {
            tracing::warn!("Email service not configured (missing SMTP environment variables)");
            None
        };

        Ok(Self {
            pool,
            jwt_secret: config.jwt_secret,
            jwt_expiry_hours: config.jwt_expiry_hours,
            bcrypt_cost: config.bcrypt_cost,
            password_reset_expiry_hours: config.password_reset_expiry_hours,
            frontend_url: config.frontend_url,
            cookie_key,
            environment: config.env,
            site: Arc::new(SiteInfo::new(config.site_title)),
            tag_page_cache: TagPageCache::default(),
            email_service,
        })
    }
}

impl FromRef<ApiState> for Key {
    fn from_ref(state: &ApiState) -> Self {
        state.cookie_key.clone()
    }
}

impl FromRef<ApiState> for AuthConfig {
    fn from_ref(state: &ApiState) -> Self {
        Self {
            jwt_secret: state.jwt_secret.clone(),
            jwt_expiry_hours: state.jwt_expiry_hours,
        }
    }
}
