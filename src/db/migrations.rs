//! Database migrations
//!
//! Migrations are embedded in the binary as SQL strings, one variant per
//! driver, and tracked in the `_migrations` table so each runs exactly once.
//! Column widths mirror the field limits enforced by model validation.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};

use super::DynDatabasePool;
use crate::config::DatabaseDriver;

/// A database migration with SQL for both SQLite and MySQL
#[derive(Debug, Clone)]
pub struct Migration {
    /// Unique, increasing version number
    pub version: i32,
    pub name: &'static str,
    pub up_sqlite: &'static str,
    pub up_mysql: &'static str,
}

/// Migration record stored in the database
#[derive(Debug, Clone)]
pub struct MigrationRecord {
    pub version: i64,
    pub name: String,
    pub applied_at: DateTime<Utc>,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_budget_posts",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS budget_posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(200) NOT NULL,
                image_url VARCHAR(500) NOT NULL,
                content TEXT NOT NULL,
                author VARCHAR(100) NOT NULL,
                date_posted DATE NOT NULL
            );
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS budget_posts (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                title VARCHAR(200) NOT NULL,
                image_url VARCHAR(500) NOT NULL,
                content LONGTEXT NOT NULL,
                author VARCHAR(100) NOT NULL,
                date_posted DATE NOT NULL
            );
        "#,
    },
    Migration {
        version: 2,
        name: "create_freelance_jobs",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS freelance_jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(255) NOT NULL,
                description TEXT NOT NULL,
                company VARCHAR(255) NOT NULL,
                location VARCHAR(255) NOT NULL,
                date_posted DATE NOT NULL
            );
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS freelance_jobs (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                title VARCHAR(255) NOT NULL,
                description LONGTEXT NOT NULL,
                company VARCHAR(255) NOT NULL,
                location VARCHAR(255) NOT NULL,
                date_posted DATE NOT NULL
            );
        "#,
    },
    Migration {
        version: 3,
        name: "create_money_making_apps",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS money_making_apps (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(255) NOT NULL,
                description TEXT NOT NULL,
                link VARCHAR(200) NOT NULL
            );
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS money_making_apps (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                name VARCHAR(255) NOT NULL,
                description LONGTEXT NOT NULL,
                link VARCHAR(200) NOT NULL
            );
        "#,
    },
    Migration {
        version: 4,
        name: "create_remote_online_jobs",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS remote_online_jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(255) NOT NULL,
                description TEXT NOT NULL,
                company VARCHAR(255) NOT NULL,
                date_posted DATE NOT NULL
            );
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS remote_online_jobs (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                title VARCHAR(255) NOT NULL,
                description LONGTEXT NOT NULL,
                company VARCHAR(255) NOT NULL,
                date_posted DATE NOT NULL
            );
        "#,
    },
    Migration {
        version: 5,
        name: "create_side_hustles",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS side_hustles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(255) NOT NULL,
                description TEXT NOT NULL
            );
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS side_hustles (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                name VARCHAR(255) NOT NULL,
                description LONGTEXT NOT NULL
            );
        "#,
    },
    Migration {
        version: 6,
        name: "create_deals_and_savings",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS deals_and_savings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(255) NOT NULL,
                description TEXT NOT NULL,
                discount_code VARCHAR(50) NOT NULL,
                expiration_date DATE NOT NULL
            );
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS deals_and_savings (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                title VARCHAR(255) NOT NULL,
                description LONGTEXT NOT NULL,
                discount_code VARCHAR(50) NOT NULL,
                expiration_date DATE NOT NULL
            );
        "#,
    },
];

/// Apply every pending migration in version order.
///
/// Returns the number of migrations applied.
pub async fn run_migrations(pool: &DynDatabasePool) -> Result<usize> {
    create_migrations_table(pool).await?;

    let applied = get_applied_migrations(pool).await?;
    let applied_versions: Vec<i64> = applied.iter().map(|m| m.version).collect();

    let mut count = 0;
    for migration in MIGRATIONS {
        if applied_versions.contains(&(migration.version as i64)) {
            continue;
        }
        tracing::info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        apply_migration(pool, migration)
            .await
            .with_context(|| format!("Failed to apply migration: {}", migration.name))?;
        count += 1;
    }

    if count > 0 {
        tracing::info!("Applied {} migration(s)", count);
    } else {
        tracing::debug!("No pending migrations");
    }

    Ok(count)
}

async fn create_migrations_table(pool: &DynDatabasePool) -> Result<()> {
    let sql = match pool.driver() {
        DatabaseDriver::Sqlite => {
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        }
        DatabaseDriver::Mysql => {
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version INT PRIMARY KEY,
                name VARCHAR(255) NOT NULL UNIQUE,
                applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        }
    };

    pool.execute(sql).await?;
    Ok(())
}

async fn get_applied_migrations(pool: &DynDatabasePool) -> Result<Vec<MigrationRecord>> {
    match (pool.as_sqlite(), pool.as_mysql()) {
        (Some(sqlite), _) => get_applied_migrations_sqlite(sqlite).await,
        (None, Some(mysql)) => get_applied_migrations_mysql(mysql).await,
        (None, None) => anyhow::bail!("Database pool exposes no driver"),
    }
}

async fn get_applied_migrations_sqlite(pool: &SqlitePool) -> Result<Vec<MigrationRecord>> {
    let rows = sqlx::query("SELECT version, name, applied_at FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .context("Failed to read applied migrations")?;

    rows.iter()
        .map(|row| -> Result<MigrationRecord> {
            Ok(MigrationRecord {
                version: row.try_get("version")?,
                name: row.try_get("name")?,
                applied_at: row.try_get("applied_at")?,
            })
        })
        .collect()
}

async fn get_applied_migrations_mysql(pool: &MySqlPool) -> Result<Vec<MigrationRecord>> {
    let rows = sqlx::query("SELECT version, name, applied_at FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .context("Failed to read applied migrations")?;

    rows.iter()
        .map(|row| -> Result<MigrationRecord> {
            let version: i32 = row.try_get("version")?;
            Ok(MigrationRecord {
                version: version as i64,
                name: row.try_get("name")?,
                applied_at: row.try_get("applied_at")?,
            })
        })
        .collect()
}

async fn apply_migration(pool: &DynDatabasePool, migration: &Migration) -> Result<()> {
    match (pool.as_sqlite(), pool.as_mysql()) {
        (Some(sqlite), _) => apply_migration_sqlite(sqlite, migration).await,
        (None, Some(mysql)) => apply_migration_mysql(mysql, migration).await,
        (None, None) => anyhow::bail!("Database pool exposes no driver"),
    }
}

async fn apply_migration_sqlite(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    let mut tx = pool.begin().await?;
    for statement in split_sql_statements(migration.up_sqlite) {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
    }
    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

// MySQL commits DDL implicitly, so a transaction would not help here.
async fn apply_migration_mysql(pool: &MySqlPool, migration: &Migration) -> Result<()> {
    for statement in split_sql_statements(migration.up_mysql) {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
    }
    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(pool)
        .await?;
    Ok(())
}

fn truncate_sql(sql: &str) -> String {
    match sql.char_indices().nth(100) {
        Some((idx, _)) => format!("{}...", &sql[..idx]),
        None => sql.to_string(),
    }
}

/// Split a migration body into statements, dropping comment-only fragments
fn split_sql_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty() && !is_comment_only(stmt))
        .collect()
}

fn is_comment_only(s: &str) -> bool {
    s.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with("--"))
}

/// Check if migrations are up to date
pub async fn is_up_to_date(pool: &DynDatabasePool) -> Result<bool> {
    Ok(pending_count(pool).await? == 0)
}

/// Number of migrations not yet applied
pub async fn pending_count(pool: &DynDatabasePool) -> Result<usize> {
    create_migrations_table(pool).await?;
    let applied = get_applied_migrations(pool).await?;
    Ok(MIGRATIONS.len().saturating_sub(applied.len()))
}

pub fn total_migrations() -> usize {
    MIGRATIONS.len()
}

pub fn get_migration(version: i32) -> Option<&'static Migration> {
    MIGRATIONS.iter().find(|m| m.version == version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::models::EntityKind;

    #[tokio::test]
    async fn test_run_migrations() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        let applied = run_migrations(&pool).await.expect("Failed to run migrations");
        assert_eq!(applied, total_migrations());

        // Running again is a no-op
        let applied = run_migrations(&pool).await.expect("Failed to rerun migrations");
        assert_eq!(applied, 0);
    }

    #[tokio::test]
    async fn test_is_up_to_date() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        assert!(!is_up_to_date(&pool).await.unwrap());
        assert_eq!(pending_count(&pool).await.unwrap(), total_migrations());

        run_migrations(&pool).await.unwrap();
        assert!(is_up_to_date(&pool).await.unwrap());
        assert_eq!(pending_count(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_every_entity_table_created() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        run_migrations(&pool).await.unwrap();
        let sqlite_pool = pool.as_sqlite().unwrap();

        for kind in EntityKind::ALL {
            let sql = format!("SELECT {} FROM {}", kind.select_list(), kind.table());
            sqlx::query(&sql)
                .fetch_all(sqlite_pool)
                .await
                .unwrap_or_else(|e| panic!("{} missing or incomplete: {}", kind.table(), e));
        }
    }

    #[tokio::test]
    async fn test_ids_are_assigned_on_insert() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        run_migrations(&pool).await.unwrap();
        let sqlite_pool = pool.as_sqlite().unwrap();

        let first = sqlx::query("INSERT INTO side_hustles (name, description) VALUES ('a', 'b')")
            .execute(sqlite_pool)
            .await
            .unwrap();
        let second = sqlx::query("INSERT INTO side_hustles (name, description) VALUES ('c', 'd')")
            .execute(sqlite_pool)
            .await
            .unwrap();
        assert!(second.last_insert_rowid() > first.last_insert_rowid());
    }

    #[test]
    fn test_get_migration() {
        assert_eq!(get_migration(1).unwrap().name, "create_budget_posts");
        assert!(get_migration(999).is_none());
        assert_eq!(total_migrations(), 6);
    }

    #[test]
    fn test_split_sql_statements() {
        let statements = split_sql_statements("CREATE TABLE a (id INT); CREATE TABLE b (id INT);");
        assert_eq!(statements, vec!["CREATE TABLE a (id INT)", "CREATE TABLE b (id INT)"]);

        let statements = split_sql_statements("-- Comment\nCREATE TABLE a (id INT);\n-- trailing");
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_is_comment_only() {
        assert!(is_comment_only("-- This is a comment"));
        assert!(is_comment_only("-- Line 1\n-- Line 2"));
        assert!(!is_comment_only("CREATE TABLE test"));
        assert!(!is_comment_only("-- Comment\nCREATE TABLE test"));
    }

    #[test]
    fn test_truncate_sql() {
        assert_eq!(truncate_sql("SELECT 1"), "SELECT 1");
        let long = "x".repeat(150);
        assert_eq!(truncate_sql(&long).len(), 103);
    }
}
