//! Money making app model

use std::fmt;

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind, FieldValue};
use super::validation::{check_required, check_text, check_url, ValidationError, DEFAULT_URL_MAX_LENGTH};

pub const NAME_MAX_LENGTH: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MoneyMakingApp {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub description: String,
    pub link: String,
}

impl MoneyMakingApp {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: description.into(),
            link: link.into(),
        }
    }
}

impl fmt::Display for MoneyMakingApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Entity for MoneyMakingApp {
    const KIND: EntityKind = EntityKind::MoneyMakingApp;

    fn id(&self) -> i64 {
        self.id
    }

    fn with_id(self, id: i64) -> Self {
        Self { id, ..self }
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Integer(self.id)),
            "name" => Some(FieldValue::from(self.name.as_str())),
            "description" => Some(FieldValue::from(self.description.as_str())),
            "link" => Some(FieldValue::from(self.link.as_str())),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_text("name", &self.name, NAME_MAX_LENGTH)?;
        check_required("description", &self.description)?;
        check_url("link", &self.link, DEFAULT_URL_MAX_LENGTH)?;
        Ok(())
    }
}
