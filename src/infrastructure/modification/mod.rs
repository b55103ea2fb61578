mod mappers;
mod queries;
mod rows;
pub mod retention_job;
pub mod sqlite_store;

pub use retention_job::{RetentionJob, RetentionReport};
pub use sqlite_store::SqliteModificationStore;
