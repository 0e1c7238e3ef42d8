//! Database layer
//!
//! Persistence for the six record types. SQLite is the default (single-file
//! deployment and tests); MySQL is selected through `database.driver`.
//!
//! # Usage
//!
//! ```ignore
//! use dollarsandlife::config::DatabaseConfig;
//! use dollarsandlife::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, SqlxDatabase,
};
