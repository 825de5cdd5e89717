use std::env;
use tracing::{debug, error, warn};

use crate::config::ConfigError;

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by the CORS layer, `*` allows any origin
    pub cors_origins: Vec<String>,
    /// Requests allowed per client inside one rate limit window
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_secs: u64,
    /// Key the rate limit on `X-Forwarded-For` rather than the socket peer
    pub trust_proxy: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = match env::var("PORT").or_else(|_| env::var("APP_PORT")) {
            Ok(raw) => raw.parse::<u16>().map_err(|e| {
                error!("Invalid PORT value: {}", e);
                ConfigError::ParseError(format!("PORT: {}", e))
            })?,
            Err(_) => {
                warn!("PORT not set, using default: 8000");
                8000
            }
        };

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:8080".to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect::<Vec<_>>();
        debug!("CORS origins: {:?}", cors_origins);

        let rate_limit_max_requests = env::var("RATE_LIMIT_MAX_REQUESTS")
            .ok()
            .map(|raw| raw.parse::<u32>())
            .transpose()
            .map_err(|e| ConfigError::ParseError(format!("RATE_LIMIT_MAX_REQUESTS: {}", e)))?
            .unwrap_or(100);

        let rate_limit_window_secs = env::var("RATE_LIMIT_WINDOW_SECS")
            .ok()
            .map(|raw| raw.parse::<u64>())
            .transpose()
            .map_err(|e| ConfigError::ParseError(format!("RATE_LIMIT_WINDOW_SECS: {}", e)))?
            .unwrap_or(15 * 60);

        let trust_proxy = env::var("TRUST_PROXY")
            .map(|raw| matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        if trust_proxy {
            debug!("Client addresses taken from forwarding headers");
        }

        let config = AppConfig {
            host,
            port,
            cors_origins,
            rate_limit_max_requests,
            rate_limit_window_secs,
            trust_proxy,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit_max_requests == 0 {
            return Err(ConfigError::ValidationError("RATE_LIMIT_MAX_REQUESTS must be greater than 0".to_string()));
        }
        if self.rate_limit_window_secs == 0 {
            return Err(ConfigError::ValidationError("RATE_LIMIT_WINDOW_SECS must be greater than 0".to_string()));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: vec!["http://localhost:3000".to_string()],
            rate_limit_max_requests: 100,
            rate_limit_window_secs: 15 * 60,
            trust_proxy: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rate_limit_is_hundred_per_quarter_hour() {
        let config = AppConfig::default();
        assert_eq!(config.rate_limit_max_requests, 100);
        assert_eq!(config.rate_limit_window_secs, 900);
        assert!(!config.trust_proxy);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = AppConfig { rate_limit_window_secs: 0, ..AppConfig::default() };
        assert!(config.validate().is_err());
    }
}
