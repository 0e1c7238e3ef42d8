//! Record service
//!
//! Business rules shared by all record types:
//! - records are validated before anything reaches storage
//! - identifiers are assigned by the store on insert
//! - reads come back in insertion order

use std::sync::Arc;

use anyhow::Context;
use thiserror::Error;

use crate::db::repositories::RecordRepository;
use crate::models::{Entity, ValidationError};
use crate::services::admin::registration;

/// Record service errors
#[derive(Debug, Error)]
pub enum RecordServiceError {
    /// No record with the requested ID
    #[error("Record not found: {0}")]
    NotFound(i64),

    /// A field violates its declared constraint
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Storage failure
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Service managing the records of one entity type
pub struct RecordService<T: Entity> {
    repo: Arc<dyn RecordRepository<T>>,
}

impl<T: Entity> RecordService<T> {
    pub fn new(repo: Arc<dyn RecordRepository<T>>) -> Self {
        Self { repo }
    }

    /// Validate and store a new record, returning it with its assigned ID.
    ///
    /// Nothing is written when validation fails.
    pub async fn create(&self, record: T) -> Result<T, RecordServiceError> {
        record.validate()?;

        let created = self
            .repo
            .create(&record)
            .await
            .with_context(|| format!("Failed to create {}", T::KIND))?;

        tracing::debug!(kind = %T::KIND, id = created.id(), "Record created");
        Ok(created)
    }

    /// Every record, ascending by ID
    pub async fn list_all(&self) -> Result<Vec<T>, RecordServiceError> {
        Ok(self.repo.list_all().await?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<T, RecordServiceError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or(RecordServiceError::NotFound(id))
    }

    /// Records matching every whitespace-separated term in at least one of
    /// the type's admin search fields. A blank query returns everything.
    pub async fn search(&self, query: &str) -> Result<Vec<T>, RecordServiceError> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_string).collect();
        let fields = registration(T::KIND).search_fields;
        Ok(self.repo.search(&terms, fields).await?)
    }

    pub async fn count(&self) -> Result<i64, RecordServiceError> {
        Ok(self.repo.count().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxRecordRepository;
    use crate::db::{create_test_pool, migrations};
    use crate::models::{BudgetPost, FreelanceJob, MoneyMakingApp, ValidationErrorKind};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    async fn setup_service<T: Entity>() -> RecordService<T> {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        RecordService::new(SqlxRecordRepository::<T>::boxed(pool))
    }

    fn jan_15() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn post(title: &str) -> BudgetPost {
        BudgetPost::new(title, "https://x.test/a.png", "Tips", "J. Doe", jan_15())
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let service = setup_service::<BudgetPost>().await;

        let created = service.create(post("Saving 101")).await.unwrap();
        assert_eq!(created.id, 1);

        let fetched = service.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let service = setup_service::<BudgetPost>().await;
        let err = service.get_by_id(42).await.unwrap_err();
        assert!(matches!(err, RecordServiceError::NotFound(42)));
    }

    #[tokio::test]
    async fn test_overlong_title_rejected_before_storage() {
        let service = setup_service::<FreelanceJob>().await;
        let job = FreelanceJob::new("x".repeat(256), "Build a site", "Acme", "Remote", jan_15());

        let err = service.create(job).await.unwrap_err();
        match err {
            RecordServiceError::Validation(e) => {
                assert_eq!(e.field, "title");
                assert_eq!(e.kind, ValidationErrorKind::TooLong { max: 255, actual: 256 });
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_link_rejected() {
        let service = setup_service::<MoneyMakingApp>().await;
        let app = MoneyMakingApp::new("Survey app", "Paid surveys", "not a url");

        assert!(matches!(
            service.create(app).await,
            Err(RecordServiceError::Validation(_))
        ));
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_uses_admin_fields() {
        let service = setup_service::<BudgetPost>().await;
        service.create(post("Saving 101")).await.unwrap();
        let mut other = post("Investing basics");
        other.author = "A. Smith".to_string();
        service.create(other).await.unwrap();

        let found = service.search("  saving  doe ").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Saving 101");

        // image_url is not a search field
        assert!(service.search("x.test").await.unwrap().is_empty());
        assert_eq!(service.search("   ").await.unwrap().len(), 2);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_list_all_returns_every_created_record(titles in prop::collection::vec("[A-Za-z ]{1,40}", 0..8)) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let service = setup_service::<BudgetPost>().await;
                let mut created = Vec::new();
                for title in &titles {
                    let title = if title.trim().is_empty() { "t".to_string() } else { title.clone() };
                    created.push(service.create(post(&title)).await.unwrap());
                }

                let listed = service.list_all().await.unwrap();
                prop_assert_eq!(listed.len(), titles.len());
                prop_assert_eq!(listed, created);
                Ok(())
            })?;
        }
    }
}
