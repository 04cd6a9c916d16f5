//! Process configuration read from the environment.
//!
//! # Environment Variables
//!
//! - `HOST`: Server host address (default: `0.0.0.0`)
//! - `PORT`: Server port (default: `3000`)
//! - `WORKER_THREADS`: Number of tokio worker threads (default: logical CPU count)
//! - `DEFAULT_PAGE_SIZE`: Page size when a request gives none (default: `20`)
//! - `MAX_PAGE_SIZE`: Upper bound for a requested page size (default: `100`)
//! - `LOG_FORMAT`: `pretty` (default) | `json`
//!
//! Storage variables are read by [`crate::infrastructure::RepositoryConfig`].

use std::env;
use std::net::SocketAddr;

use crate::api::AppConfig;
use crate::infrastructure::ConfigurationError;
use crate::infrastructure::factory::{non_empty, parse_positive};

/// Log filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "todo_list_api=debug,tower_http=debug";

// =============================================================================
// Server Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `None` lets tokio pick the logical CPU count.
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            worker_threads: None,
        }
    }
}

impl ServerConfig {
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidValue` for a malformed `PORT` or
    /// `WORKER_THREADS`.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let defaults = Self::default();

        let port = match non_empty(&lookup, "PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigurationError::InvalidValue {
                    name: "PORT".to_string(),
                    value,
                })?,
            None => defaults.port,
        };

        let worker_threads = non_empty(&lookup, "WORKER_THREADS")
            .map(|value| parse_positive("WORKER_THREADS", &value))
            .transpose()?;

        Ok(Self {
            host: non_empty(&lookup, "HOST").unwrap_or(defaults.host),
            port,
            worker_threads,
        })
    }

    /// Returns the listen address.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidValue` if `host:port` is not a
    /// socket address.
    pub fn socket_address(&self) -> Result<SocketAddr, ConfigurationError> {
        let address = format!("{}:{}", self.host, self.port);
        address
            .parse()
            .map_err(|_| ConfigurationError::InvalidValue {
                name: "HOST".to_string(),
                value: address,
            })
    }

    /// Returns the worker thread count capped at four per logical CPU.
    #[must_use]
    pub fn effective_worker_threads(&self) -> Option<usize> {
        let max_threads = std::thread::available_parallelism()
            .map(|parallelism| parallelism.get().saturating_mul(4))
            .unwrap_or(64);
        self.worker_threads.map(|threads| threads.min(max_threads))
    }
}

// =============================================================================
// Paging Configuration
// =============================================================================

impl AppConfig {
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidValue` for a non-positive size or a
    /// default larger than the maximum.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let defaults = Self::default();

        let max_page_size = match non_empty(&lookup, "MAX_PAGE_SIZE") {
            Some(value) => parse_positive("MAX_PAGE_SIZE", &value)?,
            None => defaults.max_page_size,
        };

        let default_page_size = match non_empty(&lookup, "DEFAULT_PAGE_SIZE") {
            Some(value) => parse_positive("DEFAULT_PAGE_SIZE", &value)?,
            None => defaults.default_page_size.min(max_page_size),
        };

        if default_page_size > max_page_size {
            return Err(ConfigurationError::InvalidValue {
                name: "DEFAULT_PAGE_SIZE".to_string(),
                value: default_page_size.to_string(),
            });
        }

        Ok(Self {
            default_page_size,
            max_page_size,
        })
    }
}

// =============================================================================
// Log Format
// =============================================================================

/// Output format of the `fmt` layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Anything other than `json` selects the human-readable format.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match non_empty(&lookup, "LOG_FORMAT") {
            Some(value) if value.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let variables: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect();
        move |name: &str| variables.get(name).cloned()
    }

    #[rstest]
    fn test_server_config_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(
            config.socket_address().unwrap(),
            "0.0.0.0:3000".parse::<SocketAddr>().unwrap()
        );
    }

    #[rstest]
    fn test_server_config_reads_variables() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("WORKER_THREADS", "2"),
        ]))
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.worker_threads, Some(2));
    }

    #[rstest]
    #[case("PORT", "http")]
    #[case("PORT", "70000")]
    #[case("WORKER_THREADS", "0")]
    #[case("WORKER_THREADS", "lots")]
    fn test_server_config_rejects_invalid_values(#[case] name: &str, #[case] value: &str) {
        let result = ServerConfig::from_lookup(lookup_from(&[(name, value)]));
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidValue { name: ref found, .. }) if found == name
        ));
    }

    #[rstest]
    fn test_socket_address_rejects_bad_host() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.socket_address().is_err());
    }

    #[rstest]
    fn test_effective_worker_threads_caps_large_values() {
        let config = ServerConfig {
            worker_threads: Some(usize::MAX),
            ..ServerConfig::default()
        };
        let threads = config.effective_worker_threads().unwrap();
        assert!(threads < usize::MAX);
        assert!(threads >= 1);
    }

    #[rstest]
    fn test_app_config_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[rstest]
    fn test_app_config_small_max_lowers_default() {
        let config = AppConfig::from_lookup(lookup_from(&[("MAX_PAGE_SIZE", "10")])).unwrap();
        assert_eq!(config.max_page_size, 10);
        assert_eq!(config.default_page_size, 10);
    }

    #[rstest]
    fn test_app_config_rejects_default_above_max() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("DEFAULT_PAGE_SIZE", "50"),
            ("MAX_PAGE_SIZE", "10"),
        ]));
        assert!(result.is_err());
    }

    #[rstest]
    #[case(None, LogFormat::Pretty)]
    #[case(Some("json"), LogFormat::Json)]
    #[case(Some("JSON"), LogFormat::Json)]
    #[case(Some("text"), LogFormat::Pretty)]
    fn test_log_format(#[case] value: Option<&str>, #[case] expected: LogFormat) {
        let pairs: Vec<(&str, &str)> = value.map(|value| ("LOG_FORMAT", value)).into_iter().collect();
        assert_eq!(LogFormat::from_lookup(lookup_from(&pairs)), expected);
    }
}
