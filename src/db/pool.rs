//! Connection pools
//!
//! The server opens one pool at startup and shares it between the record
//! repositories and migrations. Which backend sits behind it is decided by
//! `database.driver`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{
    mysql::{MySqlPool, MySqlPoolOptions},
    sqlite::{SqlitePool, SqlitePoolOptions},
};
use std::path::Path;
use std::sync::Arc;

use crate::config::{DatabaseConfig, DatabaseDriver};

/// What repositories and migrations need from a pool
#[async_trait]
pub trait DatabasePool: Send + Sync {
    /// Run a statement, returning affected rows
    async fn execute(&self, query: &str) -> Result<u64>;

    async fn ping(&self) -> Result<()>;

    async fn close(&self);

    fn driver(&self) -> DatabaseDriver;

    fn as_sqlite(&self) -> Option<&SqlitePool>;

    fn as_mysql(&self) -> Option<&MySqlPool>;
}

/// Shared handle to whichever backend is configured
pub type DynDatabasePool = Arc<dyn DatabasePool>;

/// A sqlx pool for one of the two supported drivers
pub enum SqlxDatabase {
    Sqlite(SqlitePool),
    Mysql(MySqlPool),
}

impl SqlxDatabase {
    /// Open a SQLite database, creating the file and its directory on first use
    pub async fn connect_sqlite(location: &str) -> Result<Self> {
        let connection_url = sqlite_connection_url(location)?;

        // Each in-memory connection is a separate database; keep a single one open
        let options = if connection_url == "sqlite::memory:" {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(10)
        };

        options
            .connect(&connection_url)
            .await
            .map(Self::Sqlite)
            .with_context(|| format!("Could not open SQLite database at {}", location))
    }

    /// Connect to MySQL; a bare `user:pass@host/db` gets the scheme added
    pub async fn connect_mysql(location: &str) -> Result<Self> {
        let connection_url = match location.strip_prefix("mysql://") {
            Some(_) => location.to_string(),
            None => format!("mysql://{}", location),
        };

        MySqlPoolOptions::new()
            .max_connections(20)
            .connect(&connection_url)
            .await
            .map(Self::Mysql)
            .with_context(|| format!("Could not connect to MySQL at {}", location))
    }
}

/// Normalize a configured SQLite location into a sqlx connection URL
fn sqlite_connection_url(location: &str) -> Result<String> {
    if location == ":memory:" || location.starts_with("sqlite::memory:") {
        return Ok("sqlite::memory:".to_string());
    }

    let path = location.strip_prefix("sqlite:").unwrap_or(location);
    let path = path.split('?').next().unwrap_or(path);
    match Path::new(path).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
            .with_context(|| format!("Could not create database directory {}", dir.display()))?,
        _ => {}
    }

    Ok(match (location.starts_with("sqlite:"), location.contains('?')) {
        (true, true) => location.to_string(),
        (true, false) => format!("{}?mode=rwc", location),
        (false, _) => format!("sqlite:{}?mode=rwc", location),
    })
}

#[async_trait]
impl DatabasePool for SqlxDatabase {
    async fn execute(&self, query: &str) -> Result<u64> {
        let rows = match self {
            Self::Sqlite(pool) => sqlx::query(query).execute(pool).await.map(|r| r.rows_affected()),
            Self::Mysql(pool) => sqlx::query(query).execute(pool).await.map(|r| r.rows_affected()),
        };
        rows.with_context(|| format!("Statement failed: {}", query))
    }

    async fn ping(&self) -> Result<()> {
        match self {
            Self::Sqlite(pool) => sqlx::query("SELECT 1").execute(pool).await.map(drop),
            Self::Mysql(pool) => sqlx::query("SELECT 1").execute(pool).await.map(drop),
        }
        .context("Database did not answer")
    }

    async fn close(&self) {
        match self {
            Self::Sqlite(pool) => pool.close().await,
            Self::Mysql(pool) => pool.close().await,
        }
    }

    fn driver(&self) -> DatabaseDriver {
        match self {
            Self::Sqlite(_) => DatabaseDriver::Sqlite,
            Self::Mysql(_) => DatabaseDriver::Mysql,
        }
    }

    fn as_sqlite(&self) -> Option<&SqlitePool> {
        match self {
            Self::Sqlite(pool) => Some(pool),
            Self::Mysql(_) => None,
        }
    }

    fn as_mysql(&self) -> Option<&MySqlPool> {
        match self {
            Self::Mysql(pool) => Some(pool),
            Self::Sqlite(_) => None,
        }
    }
}

/// Open the configured database
pub async fn create_pool(config: &DatabaseConfig) -> Result<DynDatabasePool> {
    let db = match config.driver {
        DatabaseDriver::Sqlite => SqlxDatabase::connect_sqlite(&config.url).await?,
        DatabaseDriver::Mysql => SqlxDatabase::connect_mysql(&config.url).await?,
    };
    Ok(Arc::new(db))
}

/// In-memory SQLite pool for tests
pub async fn create_test_pool() -> Result<DynDatabasePool> {
    let config = DatabaseConfig {
        driver: DatabaseDriver::Sqlite,
        url: ":memory:".to_string(),
    };
    create_pool(&config).await
}
