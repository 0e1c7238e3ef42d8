//! Database repositories
//!
//! Repository pattern implementation for database access. All entity types
//! share one generic repository since their tables have the same shape.

pub mod record;

pub use record::{RecordRepository, SqlxRecordRepository};
