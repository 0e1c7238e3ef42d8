//! Side hustle idea model

use std::fmt;

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind, FieldValue};
use super::validation::{check_required, check_text, ValidationError};

pub const NAME_MAX_LENGTH: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SideHustle {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub description: String,
}

impl SideHustle {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for SideHustle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Entity for SideHustle {
    const KIND: EntityKind = EntityKind::SideHustle;

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
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_text("name", &self.name, NAME_MAX_LENGTH)?;
        check_required("description", &self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_hustle_validation() {
        assert!(SideHustle::new("Dog walking", "Walk dogs after work").validate().is_ok());
        assert_eq!(
            SideHustle::new("Dog walking", " ").validate().unwrap_err().field,
            "description"
        );
    }
}
