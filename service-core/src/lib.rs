//! service-core: Shared infrastructure for the admin front end.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
