//! Remote online job listing model

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind, FieldValue};
use super::validation::{check_required, check_text, ValidationError};

pub const TEXT_MAX_LENGTH: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RemoteOnlineJob {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    pub description: String,
    pub company: String,
    pub date_posted: NaiveDate,
}

impl RemoteOnlineJob {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        company: impl Into<String>,
        date_posted: NaiveDate,
    ) -> Self {
        Self {
            id: 0,
            title: title.into(),
            description: description.into(),
            company: company.into(),
            date_posted,
        }
    }
}

impl fmt::Display for RemoteOnlineJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

impl Entity for RemoteOnlineJob {
    const KIND: EntityKind = EntityKind::RemoteOnlineJob;

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
            "description" => Some(FieldValue::from(self.description.as_str())),
            "company" => Some(FieldValue::from(self.company.as_str())),
            "date_posted" => Some(FieldValue::Date(self.date_posted)),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_text("title", &self.title, TEXT_MAX_LENGTH)?;
        check_required("description", &self.description)?;
        check_text("company", &self.company, TEXT_MAX_LENGTH)?;
        Ok(())
    }
}
