use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// JWT configuration structure
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret used to sign access tokens
    pub jwt_secret: String,
    /// Secret used to sign refresh tokens
    pub refresh_secret: String,
    /// Access token expiration time in minutes
    pub access_token_expiration: i64,
    /// Refresh token expiration time in minutes
    pub refresh_token_expiration: i64,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables
    ///
    /// Expected environment variables:
    /// - JWT_SECRET: Secret key for signing access tokens (required)
    /// - JWT_REFRESH_SECRET: Secret key for refresh tokens (defaults to JWT_SECRET)
    /// - JWT_ACCESS_TOKEN_EXPIRY: Access token expiration in minutes (defaults to 60)
    /// - JWT_REFRESH_TOKEN_EXPIRY: Refresh token expiration in minutes (defaults to 10080 = 1 week)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading JWT configuration from environment variables");
        Self::load("")
    }

    /// Load JWT configuration from `TEST_` prefixed environment variables
    pub fn from_test_env() -> Result<Self, ConfigError> {
        info!("Loading JWT configuration from test environment variables");
        Self::load("TEST_")
    }

    fn load(prefix: &str) -> Result<Self, ConfigError> {
        let secret_var = format!("{}JWT_SECRET", prefix);
        let jwt_secret = env::var(&secret_var).map_err(|_| {
            error!("{} environment variable not found", secret_var);
            ConfigError::EnvVarNotFound(secret_var.clone())
        })?;
        debug!("JWT secret loaded (length: {} chars)", jwt_secret.len());

        let refresh_var = format!("{}JWT_REFRESH_SECRET", prefix);
        let refresh_secret = env::var(&refresh_var).unwrap_or_else(|_| {
            warn!("{} not set, refresh tokens will be signed with {}", refresh_var, secret_var);
            jwt_secret.clone()
        });

        let access_token_expiration = read_minutes(&format!("{}JWT_ACCESS_TOKEN_EXPIRY", prefix), 60)?;
        debug!("JWT access token expiration: {} minutes", access_token_expiration);

        let refresh_token_expiration = read_minutes(&format!("{}JWT_REFRESH_TOKEN_EXPIRY", prefix), 10080)?;
        debug!("JWT refresh token expiration: {} minutes", refresh_token_expiration);

        let config = JwtConfig {
            jwt_secret,
            refresh_secret,
            access_token_expiration,
            refresh_token_expiration,
        };
        config.validate()?;

        info!("JWT configuration loaded successfully");
        Ok(config)
    }

    /// Validate the JWT configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        debug!("Validating JWT configuration");

        for (name, secret) in [("JWT secret", &self.jwt_secret), ("JWT refresh secret", &self.refresh_secret)] {
            if secret.len() < 32 {
                error!("{} is too short (minimum 32 characters required)", name);
                return Err(ConfigError::InvalidValue(format!("{} must be at least 32 characters long", name)));
            }
        }

        if self.access_token_expiration <= 0 {
            error!("Access token expiration must be greater than 0");
            return Err(ConfigError::InvalidValue("Access token expiration must be greater than 0".to_string()));
        }

        if self.refresh_token_expiration <= 0 {
            error!("Refresh token expiration must be greater than 0");
            return Err(ConfigError::InvalidValue("Refresh token expiration must be greater than 0".to_string()));
        }

        if self.access_token_expiration >= self.refresh_token_expiration {
            warn!("Access token expiration is greater than or equal to refresh token expiration");
        }

        debug!("JWT configuration validation passed");
        Ok(())
    }
}

fn read_minutes(var: &str, default: i64) -> Result<i64, ConfigError> {
    let minutes = match env::var(var) {
        Ok(raw) => raw.parse::<i64>().map_err(|e| {
            error!("Invalid {} value: {}", var, e);
            ConfigError::ParseError(format!("{}: {}", var, e))
        })?,
        Err(_) => {
            warn!("{} not set, using default: {} minutes", var, default);
            default
        }
    };
    Ok(minutes)
}

/// Create JWT configuration for testing with default values
impl Default for JwtConfig {
    fn default() -> Self {
        JwtConfig {
            jwt_secret: "test_secret_key_for_jwt_testing_should_be_long_enough_for_security_purposes".to_string(),
            refresh_secret: "test_refresh_secret_key_for_jwt_testing_and_also_long_enough".to_string(),
            access_token_expiration: 60,
            refresh_token_expiration: 10080,
        }
    }
}
