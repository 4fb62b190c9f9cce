//! Worker configuration, read from the environment at startup.

use std::time::Duration;

use crate::error::AppError;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_INTERVAL_SECS: u64 = 300;
const DEFAULT_BATCH_SIZE: usize = 50;

/// Typed worker settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// PostgreSQL connection string. Without one the worker keeps quests in
    /// memory.
    pub database_url: Option<String>,
    /// Pool size.
    pub database_max_connections: u32,
    /// Time between recurring quest batches.
    pub recurrence_interval: Duration,
    /// Most quests regenerated per batch.
    pub recurrence_batch_size: usize,
}

impl WorkerConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a variable is set but invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a variable is set but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let database_max_connections =
            parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        let interval_secs = parse_or(&lookup, "RECURRENCE_INTERVAL_SECS", DEFAULT_INTERVAL_SECS)?;
        let recurrence_batch_size =
            parse_or(&lookup, "RECURRENCE_BATCH_SIZE", DEFAULT_BATCH_SIZE)?;

        if interval_secs == 0 {
            return Err(AppError::Config(
                "RECURRENCE_INTERVAL_SECS must be positive".to_owned(),
            ));
        }
        if recurrence_batch_size == 0 {
            return Err(AppError::Config(
                "RECURRENCE_BATCH_SIZE must be positive".to_owned(),
            ));
        }

        Ok(Self {
            database_url,
            database_max_connections,
            recurrence_interval: Duration::from_secs(interval_secs),
            recurrence_batch_size,
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} must be a valid number: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<WorkerConfig, AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        WorkerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.database_url, None);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.recurrence_interval, Duration::from_secs(300));
        assert_eq!(config.recurrence_batch_size, 50);
    }

    #[test]
    fn test_reads_every_variable() {
        // Arrange
        let pairs = [
            ("DATABASE_URL", "postgres://localhost/questline"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
            ("RECURRENCE_INTERVAL_SECS", " 60 "),
            ("RECURRENCE_BATCH_SIZE", "10"),
        ];

        // Act
        let config = config_from(&pairs).unwrap();

        // Assert
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/questline")
        );
        assert_eq!(config.database_max_connections, 4);
        assert_eq!(config.recurrence_interval, Duration::from_secs(60));
        assert_eq!(config.recurrence_batch_size, 10);
    }

    #[test]
    fn test_blank_database_url_means_in_memory() {
        let config = config_from(&[("DATABASE_URL", "  ")]).unwrap();
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let result = config_from(&[("RECURRENCE_BATCH_SIZE", "lots")]);
        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("RECURRENCE_BATCH_SIZE")));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let result = config_from(&[("RECURRENCE_INTERVAL_SECS", "0")]);
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
