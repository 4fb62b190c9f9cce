//! Questline worker: startup and runtime error types.

use thiserror::Error;

/// Startup and runtime errors for the worker.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Reading job input failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_names_the_problem() {
        let err = AppError::Config("RECURRENCE_BATCH_SIZE must be positive".to_owned());
        assert_eq!(
            err.to_string(),
            "configuration error: RECURRENCE_BATCH_SIZE must be positive"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let err: AppError = std::io::Error::other("stdin closed").into();
        assert!(matches!(err, AppError::Io(_)));
    }
}
