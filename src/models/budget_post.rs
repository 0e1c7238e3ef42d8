//! Budget post model
//!
//! Budget posts are the blog articles of the site and the only record type
//! served over the public JSON endpoint.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind, FieldValue};
use super::validation::{check_required, check_text, check_url, ValidationError};

pub const TITLE_MAX_LENGTH: usize = 200;
pub const IMAGE_URL_MAX_LENGTH: usize = 500;
pub const AUTHOR_MAX_LENGTH: usize = 100;

/// A budgeting blog post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BudgetPost {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    pub image_url: String,
    pub content: String,
    pub author: String,
    pub date_posted: NaiveDate,
}

impl BudgetPost {
    /// Create an unsaved post. The ID is assigned by the database on insert.
    pub fn new(
        title: impl Into<String>,
        image_url: impl Into<String>,
        content: impl Into<String>,
        author: impl Into<String>,
        date_posted: NaiveDate,
    ) -> Self {
        Self {
            id: 0,
            title: title.into(),
            image_url: image_url.into(),
            content: content.into(),
            author: author.into(),
            date_posted,
        }
    }
}

impl fmt::Display for BudgetPost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

impl Entity for BudgetPost {
    const KIND: EntityKind = EntityKind::BudgetPost;

    fn id(&self) -> i64 {
        self.id
    }

    fn with_id(self, id: i64) -> Self {
        Self { id, ..self }
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Integer(self.id)),
            "title" => Some(FieldValue::from(self.title.as_str())),
            "image_url" => Some(FieldValue::from(self.image_url.as_str())),
            "content" => Some(FieldValue::from(self.content.as_str())),
            "author" => Some(FieldValue::from(self.author.as_str())),
            "date_posted" => Some(FieldValue::Date(self.date_posted)),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_text("title", &self.title, TITLE_MAX_LENGTH)?;
        check_url("image_url", &self.image_url, IMAGE_URL_MAX_LENGTH)?;
        check_required("content", &self.content)?;
        check_text("author", &self.author, AUTHOR_MAX_LENGTH)?;
        Ok(())
    }
}
