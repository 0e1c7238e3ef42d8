//! dollarsandlife - content backend for the Dollars & Life site
//!
//! Six flat record types (budget posts, job listings, money making apps, side
//! hustles, deals) are stored in SQLite or MySQL, created through the admin
//! command line, and budget posts are served as JSON over HTTP.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
