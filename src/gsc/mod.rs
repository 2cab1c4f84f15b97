//! Search Console API module
//!
//! Contains types, authentication, the API client, and the engines that
//! turn raw Search Console responses into analysis-ready structures.

pub mod analytics;
pub mod auth;
pub mod client;
pub mod format;
pub mod inspection;
pub mod params;
pub mod sitemaps;
pub mod types;
