//! HTTP surface of the companion service.
//!
//! Built as a library so the `tama-api` binary and the integration tests
//! mount the same router.

pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod providers;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
