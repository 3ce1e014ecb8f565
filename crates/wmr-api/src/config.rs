//! API configuration.

use std::net::{AddrParseError, SocketAddr};
use std::str::FromStr;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MAX_BODY_SIZE: usize = 512 * 1024 * 1024;

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// `*` allows any origin
    pub cors_origins: Vec<String>,
    /// Upper bound for any request body, uploads included
    pub max_body_size: usize,
    pub environment: String,
    /// Serve `/metrics`
    pub metrics_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            cors_origins: vec!["*".to_string()],
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            environment: "development".to_string(),
            metrics_enabled: true,
        }
    }
}

fn env_parsed<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl ApiConfig {
    /// Read `API_HOST`, `API_PORT`, `CORS_ORIGINS`, `MAX_BODY_SIZE`,
    /// `ENVIRONMENT` and `METRICS_ENABLED`; unset or unparsable values keep
    /// their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: env_parsed("API_PORT").unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| parse_origins(&s))
                .unwrap_or(defaults.cors_origins),
            max_body_size: env_parsed("MAX_BODY_SIZE").unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| matches!(v.trim(), "true" | "1"))
                .unwrap_or(defaults.metrics_enabled),
        }
    }

    pub fn is_production(&self) -> bool {
        is_production_env(&self.environment)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// `ENVIRONMENT` names production, in any case.
pub fn is_production_env(environment: &str) -> bool {
    environment.trim().eq_ignore_ascii_case("production")
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://a.test, http://b.test,,"),
            vec!["http://a.test", "http://b.test"]
        );
    }

    #[test]
    fn test_bind_addr() {
        let config = ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 9000,
            ..ApiConfig::default()
        };
        assert_eq!(config.bind_addr().unwrap().port(), 9000);

        let bad = ApiConfig {
            host: "not a host".to_string(),
            ..ApiConfig::default()
        };
        assert!(bad.bind_addr().is_err());
    }

    #[test]
    fn test_production_flag() {
        let mut config = ApiConfig::default();
        assert!(!config.is_production());
        config.environment = "Production".to_string();
        assert!(config.is_production());
    }
}
