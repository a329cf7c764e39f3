use serde::Deserialize;

/// Deployment environment, read from `ENV`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Server configuration loaded from environment variables (and `.env` in development).
#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    pub database_url: String,
    pub jwt_secret: String,
    /// At least 64 bytes, used to encrypt the private auth cookie.
    pub cookie_secret: String,

    #[serde(default)]
    pub env: Environment,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_jwt_expiry_hours")]
    pub jwt_expiry_hours: i64,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    #[serde(default = "default_password_reset_expiry_hours")]
    pub password_reset_expiry_hours: i64,

    #[serde(default = "default_site_title")]
    pub site_title: String,

    pub smtp_host: Option<String>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from_email: Option<String>,
    pub smtp_from_name: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:8080".to_string()]
}

fn default_frontend_url() -> String {
    "http://localhost:8080".to_string()
}

const fn default_db_max_connections() -> u32 {
    10
}

const fn default_jwt_expiry_hours() -> i64 {
    24
}

const fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

const fn default_password_reset_expiry_hours() -> i64 {
    1
}

fn default_site_title() -> String {
    "Anki".to_string()
}

impl ApiConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let config: Self = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }
        if self.cookie_secret.len() < 64 {
            anyhow::bail!("COOKIE_SECRET must be at least 64 bytes long");
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            anyhow::bail!("BCRYPT_COST must be between 4 and 31");
        }
        if self.jwt_expiry_hours <= 0 || self.password_reset_expiry_hours <= 0 {
            anyhow::bail!("token expiry settings must be positive");
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ApiConfig {
        ApiConfig {
            database_url: "postgres://localhost/anki".to_string(),
            jwt_secret: "test_jwt_secret_minimum_32_characters_long".to_string(),
            cookie_secret: "test_cookie_secret_minimum_64_characters_long_for_secure_encryption"
                .to_string(),
            env: Environment::Development,
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
            frontend_url: default_frontend_url(),
            db_max_connections: 5,
            jwt_expiry_hours: 24,
            bcrypt_cost: 4,
            password_reset_expiry_hours: 1,
            site_title: default_site_title(),
            smtp_host: None,
            smtp_username: None,
            smtp_password: None,
            smtp_from_email: None,
            smtp_from_name: None,
        }
    }

    #[test]
    fn test_validate_accepts_sane_config() {
        assert!(config().validate().is_ok());
        assert_eq!(config().bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_validate_rejects_short_cookie_secret() {
        let mut config = config();
        config.cookie_secret = "too short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_bcrypt_cost() {
        let mut config = config();
        config.bcrypt_cost = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_environment_flags() {
        assert!(Environment::Development.is_development());
        assert!(Environment::Production.is_production());
        assert!(!Environment::Production.is_development());
    }
}
