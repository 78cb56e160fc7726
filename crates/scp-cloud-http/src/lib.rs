//! HTTP binding for the SCP OpenAPI
//!
//! Every request carries the project scope and the access-key credentials as
//! headers. Non-2xx responses become [`scp_cloud::ApiError`] with the HTTP
//! status and the message the service returned.

pub mod client;
mod endpoints;

pub use client::HttpBackend;

use scp_cloud::{ResolvedConfig, Session};
use std::sync::Arc;

/// Build an authenticated session served by the HTTP binding
///
/// The session builder validates the configuration.
pub fn connect(config: ResolvedConfig) -> scp_cloud::Result<Session> {
    let backend = Arc::new(HttpBackend::new(&config)?);
    Session::builder(config).with_backend(backend).build()
}
