use std::fmt;
use thiserror::Error;

/// Failures raised by the persistent store backing the modification log.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database failure: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Corrupt modification record {record}: {reason}")]
    CorruptRow { record: String, reason: String },
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StorageError::Constraint(db_err.message().to_string())
            }
            _ => StorageError::Database(err),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Storage(StorageError),
    ConfigurationError(String),
    Internal(String),
}

impl AppError {
    pub fn is_storage(&self) -> bool {
        matches!(self, AppError::Storage(_))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Storage(err) => write!(f, "Storage error: {}", err),
            AppError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(StorageError::from(err))
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Storage(StorageError::Migration(err))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("tracking task did not complete: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
