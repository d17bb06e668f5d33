use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::classifier::SafetyPolicy;
use crate::utils::{split_list, LAKE_ID_PLACEHOLDER};

pub const DEFAULT_SNIPPET_URL_TEMPLATE: &str =
    "https://www.gesunde.sachsen.de/lua/badegewaesser/{id}-de-content.snippet";

/// Left out of every run unless `EXCLUDED_LAKES` overrides it; an empty
/// value includes every catalog lake.
pub const DEFAULT_EXCLUDED_LAKES: &str = "Harthsee";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SNIPPET_URL_TEMPLATE must contain {{id}}: {0}")]
    InvalidTemplate(String),
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub catalog_path: Option<PathBuf>,
    pub snippet_url_template: String,
    pub fetch_timeout_secs: u64,
    pub fetch_concurrency: usize,
    pub fetch_retries: usize,
    pub refresh_interval_minutes: u64,
    pub require_empty_microscopy: bool,
    /// Lake ids or names left out of every run
    pub excluded_lakes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            catalog_path: None,
            snippet_url_template: DEFAULT_SNIPPET_URL_TEMPLATE.to_string(),
            fetch_timeout_secs: 20,
            fetch_concurrency: 4,
            fetch_retries: 2,
            refresh_interval_minutes: 60,
            require_empty_microscopy: false,
            excluded_lakes: split_list(DEFAULT_EXCLUDED_LAKES),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let snippet_url_template =
            env::var("SNIPPET_URL_TEMPLATE").unwrap_or(defaults.snippet_url_template);
        if !snippet_url_template.contains(LAKE_ID_PLACEHOLDER) {
            return Err(ConfigError::InvalidTemplate(snippet_url_template));
        }

        let require_empty_microscopy = match env::var("REQUIRE_EMPTY_MICROSCOPY") {
            Ok(value) => parse_bool("REQUIRE_EMPTY_MICROSCOPY", &value)?,
            Err(_) => defaults.require_empty_microscopy,
        };

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(defaults.server_port),
            catalog_path: env::var("CATALOG_PATH").ok().map(PathBuf::from),
            snippet_url_template,
            fetch_timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .unwrap_or(defaults.fetch_timeout_secs),
            fetch_concurrency: env::var("FETCH_CONCURRENCY")
                .unwrap_or_else(|_| "4".to_string())
                .parse::<usize>()
                .unwrap_or(defaults.fetch_concurrency)
                .max(1),
            fetch_retries: env::var("FETCH_RETRIES")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .unwrap_or(defaults.fetch_retries),
            refresh_interval_minutes: env::var("REFRESH_INTERVAL_MINUTES")
                .unwrap_or_else(|_| "60".to_string())
                .parse::<u64>()
                .unwrap_or(defaults.refresh_interval_minutes)
                .max(1),
            require_empty_microscopy,
            excluded_lakes: env::var("EXCLUDED_LAKES")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.excluded_lakes),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn safety_policy(&self) -> SafetyPolicy {
        SafetyPolicy {
            require_empty_microscopy: self.require_empty_microscopy,
        }
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", "TRUE").unwrap());
        assert!(parse_bool("X", "1").unwrap());
        assert!(!parse_bool("X", "off").unwrap());
        assert!(parse_bool("X", "maybe").is_err());
    }

    #[test]
    fn test_default_server_addr() {
        assert_eq!(Config::default().server_addr(), "0.0.0.0:8080");
    }
}
