pub mod config;
pub mod error;

pub use config::{AppConfig, DatabaseConfig, RetentionConfig, TrackerConfig};
pub use error::{AppError, Result, StorageError};
