//! Record repository
//!
//! Database operations shared by every entity type.
//!
//! This module provides:
//! - `RecordRepository<T>` trait defining the storage contract for one entity type
//! - `SqlxRecordRepository<T>` implementing it for SQLite and MySQL
//!
//! Every table has the same shape (an auto-assigned `id` plus the columns listed
//! by [`EntityKind::columns`]), so the SQL is generated from that metadata and
//! rows decode through each model's `sqlx::FromRow` derive.

use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{
    mysql::{MySql, MySqlArguments},
    query::Query,
    sqlite::{Sqlite, SqliteArguments},
    MySqlPool, Row, SqlitePool,
};

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Entity, EntityKind, FieldValue};

/// Storage contract for a single entity type
#[async_trait]
pub trait RecordRepository<T: Entity>: Send + Sync {
    /// Insert a record and return it with its assigned ID
    async fn create(&self, record: &T) -> Result<T>;

    /// Get a record by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<T>>;

    /// All records in insertion order (ascending ID)
    async fn list_all(&self) -> Result<Vec<T>>;

    /// Records where every term matches at least one of `fields`
    /// (case-insensitive substring), in insertion order.
    async fn search(&self, terms: &[String], fields: &'static [&'static str]) -> Result<Vec<T>>;

    /// Number of stored records
    async fn count(&self) -> Result<i64>;
}

/// SQLx-backed repository for any [`Entity`]
pub struct SqlxRecordRepository<T> {
    pool: DynDatabasePool,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> SqlxRecordRepository<T> {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn RecordRepository<T>> {
        Arc::new(Self::new(pool))
    }

    fn backend(&self) -> Result<Backend<'_>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => self.pool.as_sqlite().map(Backend::Sqlite),
            DatabaseDriver::Mysql => self.pool.as_mysql().map(Backend::Mysql),
        }
        .context("Database pool does not match its configured driver")
    }
}

enum Backend<'a> {
    Sqlite(&'a SqlitePool),
    Mysql(&'a MySqlPool),
}

#[async_trait]
impl<T: Entity> RecordRepository<T> for SqlxRecordRepository<T> {
    async fn create(&self, record: &T) -> Result<T> {
        match self.backend()? {
            Backend::Sqlite(pool) => create_sqlite(pool, record).await,
            Backend::Mysql(pool) => create_mysql(pool, record).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<T>> {
        let sql = select_by_id_sql(T::KIND);
        let record = match self.backend()? {
            Backend::Sqlite(pool) => {
                sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(pool).await
            }
            Backend::Mysql(pool) => {
                sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(pool).await
            }
        };
        record.with_context(|| format!("Failed to get {} {}", T::KIND, id))
    }

    async fn list_all(&self) -> Result<Vec<T>> {
        let sql = select_all_sql(T::KIND);
        let records = match self.backend()? {
            Backend::Sqlite(pool) => sqlx::query_as::<_, T>(&sql).fetch_all(pool).await,
            Backend::Mysql(pool) => sqlx::query_as::<_, T>(&sql).fetch_all(pool).await,
        };
        records.with_context(|| format!("Failed to list {}", T::KIND.table()))
    }

    async fn search(&self, terms: &[String], fields: &'static [&'static str]) -> Result<Vec<T>> {
        if terms.is_empty() || fields.is_empty() {
            return self.list_all().await;
        }

        let sql = search_sql(T::KIND, fields, terms.len());
        let patterns: Vec<String> = terms
            .iter()
            .flat_map(|term| std::iter::repeat(like_pattern(term)).take(fields.len()))
            .collect();

        let records = match self.backend()? {
            Backend::Sqlite(pool) => {
                let mut query = sqlx::query_as::<_, T>(&sql);
                for pattern in &patterns {
                    query = query.bind(pattern.as_str());
                }
                query.fetch_all(pool).await
            }
            Backend::Mysql(pool) => {
                let mut query = sqlx::query_as::<_, T>(&sql);
                for pattern in &patterns {
                    query = query.bind(pattern.as_str());
                }
                query.fetch_all(pool).await
            }
        };
        records.with_context(|| format!("Failed to search {}", T::KIND.table()))
    }

    async fn count(&self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) AS count FROM {}", T::KIND.table());
        let count = match self.backend()? {
            Backend::Sqlite(pool) => sqlx::query(&sql)
                .fetch_one(pool)
                .await
                .and_then(|row| row.try_get::<i64, _>("count")),
            Backend::Mysql(pool) => sqlx::query(&sql)
                .fetch_one(pool)
                .await
                .and_then(|row| row.try_get::<i64, _>("count")),
        };
        count.with_context(|| format!("Failed to count {}", T::KIND.table()))
    }
}

// SQLite implementations
async fn create_sqlite<T: Entity>(pool: &SqlitePool, record: &T) -> Result<T> {
    let sql = insert_sql(T::KIND);
    let values = record.values();
    let result = bind_sqlite(sqlx::query(&sql), &values)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create {}", T::KIND))?;

    Ok(record.clone().with_id(result.last_insert_rowid()))
}

fn bind_sqlite<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    values: &'q [FieldValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in values {
        query = match value {
            FieldValue::Integer(v) => query.bind(*v),
            FieldValue::Text(v) => query.bind(v.as_str()),
            FieldValue::Date(v) => query.bind(*v),
        };
    }
    query
}

// MySQL implementations
async fn create_mysql<T: Entity>(pool: &MySqlPool, record: &T) -> Result<T> {
    let sql = insert_sql(T::KIND);
    let values = record.values();
    let result = bind_mysql(sqlx::query(&sql), &values)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create {}", T::KIND))?;

    Ok(record.clone().with_id(result.last_insert_id() as i64))
}

fn bind_mysql<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    values: &'q [FieldValue],
) -> Query<'q, MySql, MySqlArguments> {
    for value in values {
        query = match value {
            FieldValue::Integer(v) => query.bind(*v),
            FieldValue::Text(v) => query.bind(v.as_str()),
            FieldValue::Date(v) => query.bind(*v),
        };
    }
    query
}

// SQL shared by both drivers (both use `?` placeholders)
fn select_all_sql(kind: EntityKind) -> String {
    format!("SELECT {} FROM {} ORDER BY id", kind.select_list(), kind.table())
}

fn select_by_id_sql(kind: EntityKind) -> String {
    format!("SELECT {} FROM {} WHERE id = ?", kind.select_list(), kind.table())
}

fn insert_sql(kind: EntityKind) -> String {
    let columns = kind.columns();
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        kind.table(),
        columns.join(", "),
        placeholders
    )
}

fn search_sql(kind: EntityKind, fields: &[&str], term_count: usize) -> String {
    let per_term = fields
        .iter()
        .map(|field| format!("{} LIKE ? ESCAPE '!'", field))
        .collect::<Vec<_>>()
        .join(" OR ");
    let conditions = vec![format!("({})", per_term); term_count].join(" AND ");
    format!(
        "SELECT {} FROM {} WHERE {} ORDER BY id",
        kind.select_list(),
        kind.table(),
        conditions
    )
}

/// `%term%` with LIKE wildcards in the term matched literally
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '!') {
            pattern.push('!');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
