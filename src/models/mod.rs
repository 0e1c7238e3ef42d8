//! Data models
//!
//! This module contains the record types served by the dollarsandlife backend.
//! Each type is a flat record with scalar fields stored in its own table;
//! there are no relationships between them.

mod budget_post;
mod deal_and_saving;
mod entity;
mod freelance_job;
mod money_making_app;
mod remote_online_job;
mod side_hustle;
pub mod validation;

pub use budget_post::BudgetPost;
pub use deal_and_saving::DealAndSaving;
pub use entity::{get_field, Entity, EntityKind, FieldValue};
pub use freelance_job::FreelanceJob;
pub use money_making_app::MoneyMakingApp;
pub use remote_online_job::RemoteOnlineJob;
pub use side_hustle::SideHustle;
pub use validation::{ValidationError, ValidationErrorKind};
