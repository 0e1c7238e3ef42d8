//! Administrative surface
//!
//! Records are created only through here: fixture files are validated as a
//! whole and then inserted. Each entity kind is registered with the columns
//! shown in its list view and the fields its search box looks at.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::db::repositories::SqlxRecordRepository;
use crate::db::DynDatabasePool;
use crate::models::{
    get_field, BudgetPost, DealAndSaving, Entity, EntityKind, FreelanceJob, MoneyMakingApp,
    RemoteOnlineJob, SideHustle, ValidationError,
};
use crate::services::record::{RecordService, RecordServiceError};

/// How an entity kind appears in the admin views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminRegistration {
    pub kind: EntityKind,
    /// Columns of the list view, in display order
    pub list_display: &'static [&'static str],
    /// Fields matched by the search box
    pub search_fields: &'static [&'static str],
}

/// Admin registration for an entity kind
pub fn registration(kind: EntityKind) -> AdminRegistration {
    let list_display: &'static [&'static str] = match kind {
        EntityKind::BudgetPost => &["title", "author", "date_posted"],
        EntityKind::FreelanceJob => &["title", "company", "location", "date_posted"],
        EntityKind::MoneyMakingApp => &["name", "link"],
        EntityKind::RemoteOnlineJob => &["title", "company", "date_posted"],
        EntityKind::SideHustle => &["name"],
        EntityKind::DealAndSaving => &["title", "discount_code", "expiration_date"],
    };

    AdminRegistration {
        kind,
        list_display,
        search_fields: kind.text_fields(),
    }
}

/// Admin errors
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Failed to read fixture file {path:?}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse fixture: {0}")]
    ParseError(String),

    /// A fixture record failed validation; nothing was imported
    #[error("{kind} #{index}: {source}")]
    InvalidRecord {
        kind: EntityKind,
        index: usize,
        #[source]
        source: ValidationError,
    },

    #[error(transparent)]
    Service(#[from] RecordServiceError),
}

/// A batch of records to import, one list per entity kind
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Fixture {
    pub budget_posts: Vec<BudgetPost>,
    pub freelance_jobs: Vec<FreelanceJob>,
    pub money_making_apps: Vec<MoneyMakingApp>,
    pub remote_online_jobs: Vec<RemoteOnlineJob>,
    pub side_hustles: Vec<SideHustle>,
    pub deals_and_savings: Vec<DealAndSaving>,
}

impl Fixture {
    /// Load a fixture file. `.json` files are read as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self, AdminError> {
        let content = std::fs::read_to_string(path).map_err(|source| AdminError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(&content).map_err(|e| AdminError::ParseError(e.to_string()))
        } else {
            Self::from_yaml(&content)
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self, AdminError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| AdminError::ParseError(e.to_string()))
    }

    /// Total number of records across all kinds
    pub fn len(&self) -> usize {
        self.budget_posts.len()
            + self.freelance_jobs.len()
            + self.money_making_apps.len()
            + self.remote_online_jobs.len()
            + self.side_hustles.len()
            + self.deals_and_savings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate every record, reporting the first violation
    pub fn validate(&self) -> Result<(), AdminError> {
        validate_all(&self.budget_posts)?;
        validate_all(&self.freelance_jobs)?;
        validate_all(&self.money_making_apps)?;
        validate_all(&self.remote_online_jobs)?;
        validate_all(&self.side_hustles)?;
        validate_all(&self.deals_and_savings)?;
        Ok(())
    }
}

fn validate_all<T: Entity>(records: &[T]) -> Result<(), AdminError> {
    for (index, record) in records.iter().enumerate() {
        record
            .validate()
            .map_err(|source| AdminError::InvalidRecord {
                kind: T::KIND,
                index,
                source,
            })?;
    }
    Ok(())
}

/// Number of records imported for one kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportCount {
    pub kind: EntityKind,
    pub count: usize,
}

/// Import a fixture. Every record is validated before the first insert, so an
/// invalid record leaves the store untouched. IDs in the fixture are ignored.
pub async fn import_fixture(
    pool: &DynDatabasePool,
    fixture: &Fixture,
) -> Result<Vec<ImportCount>, AdminError> {
    fixture.validate()?;

    let counts = vec![
        insert_all(pool, &fixture.budget_posts).await?,
        insert_all(pool, &fixture.freelance_jobs).await?,
        insert_all(pool, &fixture.money_making_apps).await?,
        insert_all(pool, &fixture.remote_online_jobs).await?,
        insert_all(pool, &fixture.side_hustles).await?,
        insert_all(pool, &fixture.deals_and_savings).await?,
    ];

    tracing::info!(records = fixture.len(), "Fixture imported");
    Ok(counts)
}

async fn insert_all<T: Entity>(
    pool: &DynDatabasePool,
    records: &[T],
) -> Result<ImportCount, AdminError> {
    let service = service_for::<T>(pool);
    for record in records {
        service.create(record.clone()).await?;
    }
    Ok(ImportCount {
        kind: T::KIND,
        count: records.len(),
    })
}

fn service_for<T: Entity>(pool: &DynDatabasePool) -> RecordService<T> {
    RecordService::new(SqlxRecordRepository::<T>::boxed(pool.clone()))
}

/// One line of an admin list view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRow {
    pub id: i64,
    /// The record's string form (title or name)
    pub display: String,
    /// Values of the registered list columns, formatted for display
    pub values: Vec<String>,
}

fn to_row<T: Entity>(record: &T) -> AdminRow {
    let values = registration(T::KIND)
        .list_display
        .iter()
        .map(|column| {
            get_field(record, column)
                .map(|value| value.to_string())
                .unwrap_or_default()
        })
        .collect();

    AdminRow {
        id: record.id(),
        display: record.to_string(),
        values,
    }
}

/// List view: every record of `kind` in insertion order
pub async fn list_rows(pool: &DynDatabasePool, kind: EntityKind) -> Result<Vec<AdminRow>, AdminError> {
    search_rows(pool, kind, "").await
}

/// Search view: records where every whitespace-separated term appears
/// (case-insensitively) in at least one registered search field
pub async fn search_rows(
    pool: &DynDatabasePool,
    kind: EntityKind,
    query: &str,
) -> Result<Vec<AdminRow>, AdminError> {
    match kind {
        EntityKind::BudgetPost => rows_for::<BudgetPost>(pool, query).await,
        EntityKind::FreelanceJob => rows_for::<FreelanceJob>(pool, query).await,
        EntityKind::MoneyMakingApp => rows_for::<MoneyMakingApp>(pool, query).await,
        EntityKind::RemoteOnlineJob => rows_for::<RemoteOnlineJob>(pool, query).await,
        EntityKind::SideHustle => rows_for::<SideHustle>(pool, query).await,
        EntityKind::DealAndSaving => rows_for::<DealAndSaving>(pool, query).await,
    }
}

async fn rows_for<T: Entity>(pool: &DynDatabasePool, query: &str) -> Result<Vec<AdminRow>, AdminError> {
    let records = service_for::<T>(pool).search(query).await?;
    Ok(records.iter().map(to_row).collect())
}
