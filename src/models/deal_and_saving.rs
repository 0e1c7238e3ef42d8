//! Deal and saving model
//!
//! Discount offers with a code and an expiration date.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind, FieldValue};
use super::validation::{check_required, check_text, ValidationError};

pub const TITLE_MAX_LENGTH: usize = 255;
pub const DISCOUNT_CODE_MAX_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DealAndSaving {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    pub description: String,
    pub discount_code: String,
    pub expiration_date: NaiveDate,
}

impl DealAndSaving {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        discount_code: impl Into<String>,
        expiration_date: NaiveDate,
    ) -> Self {
        Self {
            id: 0,
            title: title.into(),
            description: description.into(),
            discount_code: discount_code.into(),
            expiration_date,
        }
    }
}

impl fmt::Display for DealAndSaving {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

impl Entity for DealAndSaving {
    const KIND: EntityKind = EntityKind::DealAndSaving;

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
            "discount_code" => Some(FieldValue::from(self.discount_code.as_str())),
            "expiration_date" => Some(FieldValue::Date(self.expiration_date)),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_text("title", &self.title, TITLE_MAX_LENGTH)?;
        check_required("description", &self.description)?;
        check_text("discount_code", &self.discount_code, DISCOUNT_CODE_MAX_LENGTH)?;
        Ok(())
    }
}
