//! SCP provider
//!
//! Resource handlers and data sources for Samsung SDS Cloud, wired into the
//! dispatch registry of `scp-cloud`.
//!
//! ```no_run
//! use scp_cloud::{OperationContext, ProviderBlock, ResourceData};
//! use serde_json::json;
//!
//! # async fn run() -> scp_cloud::Result<()> {
//! let provider = scp_provider::provider()?;
//! let session = provider.configure(&ProviderBlock::default())?;
//!
//! let handler = provider.resource("scp_dns_record")?;
//! let planned = ResourceData::from_value(json!({
//!     "dns_domain_id": "DOMAIN-1",
//!     "record_name": "www",
//!     "record_type": "A",
//!     "record_value": "10.0.0.1",
//! }))?;
//! let state = handler.create(&OperationContext::new(session), planned).await?;
//! println!("created {}", state.id);
//! # Ok(())
//! # }
//! ```

pub mod data_sources;
pub mod provider;
pub mod resources;

pub use provider::{PROVIDER_NAME, Provider, provider, provider_schema, registrations, resolve_with};
