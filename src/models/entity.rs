//! Entity schema metadata
//!
//! All six record types are flat tables with an auto-assigned integer `id`
//! and a handful of scalar columns. [`EntityKind`] carries the static schema
//! (table, columns, admin views) and [`Entity`] is implemented by each record
//! struct so the storage layer can handle any of them generically.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{mysql::MySqlRow, sqlite::SqliteRow, FromRow};

use super::validation::ValidationError;

/// The six record types known to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    BudgetPost,
    FreelanceJob,
    MoneyMakingApp,
    RemoteOnlineJob,
    SideHustle,
    DealAndSaving,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        Self::BudgetPost,
        Self::FreelanceJob,
        Self::MoneyMakingApp,
        Self::RemoteOnlineJob,
        Self::SideHustle,
        Self::DealAndSaving,
    ];

    /// Database table name
    pub fn table(&self) -> &'static str {
        match self {
            Self::BudgetPost => "budget_posts",
            Self::FreelanceJob => "freelance_jobs",
            Self::MoneyMakingApp => "money_making_apps",
            Self::RemoteOnlineJob => "remote_online_jobs",
            Self::SideHustle => "side_hustles",
            Self::DealAndSaving => "deals_and_savings",
        }
    }

    /// Kebab-case name used on the command line
    pub fn slug(&self) -> &'static str {
        match self {
            Self::BudgetPost => "budget-post",
            Self::FreelanceJob => "freelance-job",
            Self::MoneyMakingApp => "money-making-app",
            Self::RemoteOnlineJob => "remote-online-job",
            Self::SideHustle => "side-hustle",
            Self::DealAndSaving => "deal-and-saving",
        }
    }

    /// Human-readable plural label
    pub fn label(&self) -> &'static str {
        match self {
            Self::BudgetPost => "Budget posts",
            Self::FreelanceJob => "Freelance jobs",
            Self::MoneyMakingApp => "Money making apps",
            Self::RemoteOnlineJob => "Remote online jobs",
            Self::SideHustle => "Side hustles",
            Self::DealAndSaving => "Deals and savings",
        }
    }

    /// Writable columns in insert order (everything except `id`)
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::BudgetPost => &["title", "image_url", "content", "author", "date_posted"],
            Self::FreelanceJob => &["title", "description", "company", "location", "date_posted"],
            Self::MoneyMakingApp => &["name", "description", "link"],
            Self::RemoteOnlineJob => &["title", "description", "company", "date_posted"],
            Self::SideHustle => &["name", "description"],
            Self::DealAndSaving => &["title", "description", "discount_code", "expiration_date"],
        }
    }

    /// Columns holding free text (string and long text)
    pub fn text_fields(&self) -> &'static [&'static str] {
        match self {
            Self::BudgetPost => &["title", "content", "author"],
            Self::FreelanceJob => &["title", "description", "company", "location"],
            Self::MoneyMakingApp => &["name", "description"],
            Self::RemoteOnlineJob => &["title", "description", "company"],
            Self::SideHustle => &["name", "description"],
            Self::DealAndSaving => &["title", "description", "discount_code"],
        }
    }

    /// `id` followed by the writable columns
    pub fn select_list(&self) -> String {
        std::iter::once("id")
            .chain(self.columns().iter().copied())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|kind| {
                kind.slug() == normalized || kind.table().replace('_', "-") == normalized
            })
            .ok_or_else(|| anyhow::anyhow!("Unknown entity type: {}", s))
    }
}

/// A single column value read from a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
    Date(NaiveDate),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{}", v),
            Self::Text(v) => f.write_str(v),
            Self::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

/// A record type persisted in its own table.
///
/// Implementors decode from either driver's rows through `sqlx::FromRow` and
/// expose their columns by name so storage and admin code stay generic.
pub trait Entity:
    Clone
    + Send
    + Sync
    + Unpin
    + 'static
    + fmt::Display
    + for<'r> FromRow<'r, SqliteRow>
    + for<'r> FromRow<'r, MySqlRow>
{
    const KIND: EntityKind;

    /// Store-assigned identifier (0 before insert)
    fn id(&self) -> i64;

    /// Copy of this record carrying the identifier assigned on insert
    fn with_id(self, id: i64) -> Self;

    /// Column value by name, `id` included; `None` for unknown names
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Values of [`EntityKind::columns`], in the same order
    fn values(&self) -> Vec<FieldValue> {
        Self::KIND
            .columns()
            .iter()
            .filter_map(|column| self.field(column))
            .collect()
    }

    /// Check declared field constraints
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Read a field of any record by name
pub fn get_field<T: Entity>(record: &T, field_name: &str) -> Option<FieldValue> {
    record.field(field_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str_accepts_slug_and_table() {
        assert_eq!("budget-post".parse::<EntityKind>().unwrap(), EntityKind::BudgetPost);
        assert_eq!("side_hustles".parse::<EntityKind>().unwrap(), EntityKind::SideHustle);
        assert_eq!("Deal_And_Saving".parse::<EntityKind>().unwrap(), EntityKind::DealAndSaving);
        assert!("blog".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_tables_are_distinct() {
        let mut tables: Vec<_> = EntityKind::ALL.iter().map(|k| k.table()).collect();
        tables.sort();
        tables.dedup();
        assert_eq!(tables.len(), EntityKind::ALL.len());
    }

    #[test]
    fn test_text_fields_are_columns() {
        for kind in EntityKind::ALL {
            for field in kind.text_fields() {
                assert!(kind.columns().contains(field), "{} not a column of {}", field, kind);
            }
        }
    }

    #[test]
    fn test_select_list() {
        assert_eq!(EntityKind::SideHustle.select_list(), "id, name, description");
    }

    #[test]
    fn test_field_value_display() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(FieldValue::Date(date).to_string(), "2024-01-15");
        assert_eq!(FieldValue::Integer(7).to_string(), "7");
        assert_eq!(FieldValue::from("Tips").to_string(), "Tips");
    }
}
