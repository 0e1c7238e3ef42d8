//! Services layer - Business logic
//!
//! Services sit between the HTTP/CLI surfaces and the repositories:
//! - `record`: validated creation and reads for any record type
//! - `admin`: registrations, fixture import, list and search views
//! - `rate_limiter`: per-IP request limits for the public API

pub mod admin;
pub mod rate_limiter;
pub mod record;

pub use admin::{
    import_fixture, list_rows, registration, search_rows, AdminError, AdminRegistration, AdminRow,
    Fixture, ImportCount,
};
pub use rate_limiter::{RateLimitDecision, RateLimiter};
pub use record::{RecordService, RecordServiceError};
