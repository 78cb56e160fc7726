//! SCP provider core
//!
//! Configuration resolution, authenticated sessions, the resource dispatch
//! table and the reconciliation loop shared by every resource handler.
//!
//! ```no_run
//! use scp_cloud::{ConfigResolver, ProviderBlock};
//! use scp_profile::ProfileContext;
//!
//! # fn main() -> scp_cloud::Result<()> {
//! let block = ProviderBlock::default();
//! let ctx = ProfileContext::new()?;
//! let config = ConfigResolver::discover(&block, &ctx).resolve(&block)?;
//! println!("{}", config.host);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cancel;
pub mod config;
pub mod data;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod registry;
pub mod schema;
pub mod session;
pub mod waiter;

pub use api::{ApiError, ApiResult, AsyncResponse, OptionalBool};
pub use cancel::{CancelHandle, CancelToken};
pub use config::{
    Attribute, AuthMethod, ConfigResolver, DEFAULT_HOST, EnvLookup, FileLayer, ProcessEnv,
    ProviderBlock, ResolvedConfig, mask_secret, section_name,
};
pub use data::ResourceData;
pub use error::{CloudError, Result};
pub use identity::{merge_id, split_id};
pub use lifecycle::{
    DataSource, DataSourceAdapter, Lifecycle, OperationContext, ResourceAdapter, WaitSpec,
    wait_for,
};
pub use registry::{DataSourceHandler, Registration, Registry, RegistryBuilder, ResourceHandler};
pub use schema::{AttributeSchema, AttributeType, Schema, Validator};
pub use session::{CloudBackend, Session, SessionBuilder};
pub use waiter::{WaitPolicy, wait_for_status};
