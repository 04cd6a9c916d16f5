//! Repository factory for runtime backend selection.
//!
//! # Environment Variables
//!
//! - `STORAGE_MODE`: `in_memory` (default) | `postgres`
//! - `DATABASE_URL`: `PostgreSQL` connection URL (required when `STORAGE_MODE=postgres`)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: `5`)
//!
//! # Example
//!
//! ```ignore
//! let config = RepositoryConfig::from_env()?;
//! let repository = RepositoryFactory::new(config).create().await?;
//! ```

use std::env;
use std::str::FromStr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use super::{InMemoryTaskRepository, PostgresTaskRepository, RepositoryError, TaskRepository};

/// Default size of the `PostgreSQL` connection pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// =============================================================================
// Configuration Types
// =============================================================================

/// Storage backend for tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Process-local storage. Suitable for development and tests.
    #[default]
    InMemory,
    /// `PostgreSQL` storage for production use.
    Postgres,
}

impl FromStr for StorageMode {
    type Err = ConfigurationError;

    /// Parses a storage mode from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidStorageMode` if the string is not recognized.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            _ => Err(ConfigurationError::InvalidStorageMode(value.to_string())),
        }
    }
}

/// Configuration for the repository factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub storage_mode: StorageMode,
    /// `PostgreSQL` connection URL (required when `storage_mode` is `Postgres`).
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            storage_mode: StorageMode::default(),
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl RepositoryConfig {
    /// Creates a configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if:
    /// - `STORAGE_MODE` contains an invalid value
    /// - `DATABASE_MAX_CONNECTIONS` is not a positive integer
    /// - `DATABASE_URL` is missing when `STORAGE_MODE=postgres`
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Creates a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let storage_mode = match non_empty(&lookup, "STORAGE_MODE") {
            Some(value) => value.parse()?,
            None => StorageMode::default(),
        };

        let max_connections = match non_empty(&lookup, "DATABASE_MAX_CONNECTIONS") {
            Some(value) => parse_positive("DATABASE_MAX_CONNECTIONS", &value)?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let config = Self {
            storage_mode,
            database_url: non_empty(&lookup, "DATABASE_URL"),
            max_connections,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingDatabaseUrl` if `PostgreSQL` is
    /// selected without a URL.
    pub const fn validate(&self) -> Result<(), ConfigurationError> {
        if matches!(self.storage_mode, StorageMode::Postgres) && self.database_url.is_none() {
            return Err(ConfigurationError::MissingDatabaseUrl);
        }
        Ok(())
    }
}

/// Looks up a variable, treating empty or whitespace-only values as unset.
pub(crate) fn non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parses a strictly positive integer setting.
pub(crate) fn parse_positive<T>(name: &str, value: &str) -> Result<T, ConfigurationError>
where
    T: FromStr + Default + PartialEq,
{
    match value.parse::<T>() {
        Ok(parsed) if parsed != T::default() => Ok(parsed),
        _ => Err(ConfigurationError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while reading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Invalid storage mode value.
    #[error("Invalid storage mode: '{0}'. Expected 'in_memory' or 'postgres'")]
    InvalidStorageMode(String),

    /// Missing `DATABASE_URL` when storage mode is Postgres.
    #[error("DATABASE_URL environment variable is required when STORAGE_MODE=postgres")]
    MissingDatabaseUrl,

    /// A variable holds a value of the wrong shape.
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: String, value: String },
}

/// Errors that can occur during factory initialization.
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Database connection error: {0}")]
    DatabaseConnection(String),

    #[error("Schema initialization error: {0}")]
    Schema(#[from] RepositoryError),
}

// =============================================================================
// Repository Factory
// =============================================================================

/// Factory for creating the task repository selected by configuration.
#[derive(Debug, Clone)]
pub struct RepositoryFactory {
    config: RepositoryConfig,
}

impl RepositoryFactory {
    #[must_use]
    pub const fn new(config: RepositoryConfig) -> Self {
        Self { config }
    }

    /// Creates a new repository factory from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError::Configuration` if environment configuration is invalid.
    pub fn from_env() -> Result<Self, FactoryError> {
        let config = RepositoryConfig::from_env()?;
        Ok(Self::new(config))
    }

    #[must_use]
    pub const fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Creates the repository.
    ///
    /// For `PostgreSQL` this connects the pool and creates the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError` if the database connection or schema setup fails.
    pub async fn create(&self) -> Result<Arc<dyn TaskRepository>, FactoryError> {
        match self.config.storage_mode {
            StorageMode::InMemory => Ok(Arc::new(InMemoryTaskRepository::new())),
            StorageMode::Postgres => {
                let repository = self.create_postgres_repository().await?;
                Ok(Arc::new(repository))
            }
        }
    }

    async fn create_postgres_repository(&self) -> Result<PostgresTaskRepository, FactoryError> {
        let database_url = self
            .config
            .database_url
            .as_ref()
            .ok_or(ConfigurationError::MissingDatabaseUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(self.config.max_connections)
            .connect(database_url)
            .await
            .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))?;

        let repository = PostgresTaskRepository::new(pool);
        repository.ensure_schema().await?;
        Ok(repository)
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

    // -------------------------------------------------------------------------
    // StorageMode Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[case("in_memory", StorageMode::InMemory)]
    #[case("memory", StorageMode::InMemory)]
    #[case("IN_MEMORY", StorageMode::InMemory)]
    #[case("postgres", StorageMode::Postgres)]
    #[case("postgresql", StorageMode::Postgres)]
    #[case("PG", StorageMode::Postgres)]
    fn test_storage_mode_from_str_valid(#[case] input: &str, #[case] expected: StorageMode) {
        assert_eq!(input.parse::<StorageMode>().unwrap(), expected);
    }

    #[rstest]
    #[case("invalid")]
    #[case("mysql")]
    #[case("")]
    fn test_storage_mode_from_str_invalid(#[case] input: &str) {
        match input.parse::<StorageMode>().unwrap_err() {
            ConfigurationError::InvalidStorageMode(value) => assert_eq!(value, input),
            other => panic!("Expected InvalidStorageMode error, got {other:?}"),
        }
    }

    // -------------------------------------------------------------------------
    // RepositoryConfig Tests
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_config_defaults() {
        let config = RepositoryConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, RepositoryConfig::default());
        assert_eq!(config.max_connections, 5);
    }

    #[rstest]
    fn test_config_postgres() {
        let config = RepositoryConfig::from_lookup(lookup_from(&[
            ("STORAGE_MODE", "postgres"),
            ("DATABASE_URL", " postgres://localhost/todo "),
            ("DATABASE_MAX_CONNECTIONS", "12"),
        ]))
        .unwrap();

        assert_eq!(config.storage_mode, StorageMode::Postgres);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/todo")
        );
        assert_eq!(config.max_connections, 12);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn test_config_postgres_requires_url(#[case] url: &str) {
        let result = RepositoryConfig::from_lookup(lookup_from(&[
            ("STORAGE_MODE", "postgres"),
            ("DATABASE_URL", url),
        ]));
        assert_eq!(result, Err(ConfigurationError::MissingDatabaseUrl));
    }

    #[rstest]
    #[case("0")]
    #[case("-3")]
    #[case("many")]
    fn test_config_rejects_invalid_pool_size(#[case] value: &str) {
        let result =
            RepositoryConfig::from_lookup(lookup_from(&[("DATABASE_MAX_CONNECTIONS", value)]));
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidValue { name, .. }) if name == "DATABASE_MAX_CONNECTIONS"
        ));
    }

    // -------------------------------------------------------------------------
    // RepositoryFactory Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[tokio::test]
    async fn test_factory_creates_in_memory_repository() {
        let factory = RepositoryFactory::new(RepositoryConfig::default());
        let repository = factory.create().await.unwrap();

        let page = repository
            .find_all(crate::infrastructure::Pageable::default())
            .await
            .unwrap();
        assert_eq!(page.total_elements, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn test_factory_rejects_postgres_without_url() {
        let config = RepositoryConfig {
            storage_mode: StorageMode::Postgres,
            ..RepositoryConfig::default()
        };
        let result = RepositoryFactory::new(config).create().await;
        assert!(matches!(
            result,
            Err(FactoryError::Configuration(
                ConfigurationError::MissingDatabaseUrl
            ))
        ));
    }
}
