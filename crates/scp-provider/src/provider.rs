//! Provider entry point
//!
//! The host sees the provider as a block schema plus two dispatch tables.
//! `configure` turns a provider block into a [`Session`] for the handlers.

use crate::data_sources::virtual_servers;
use crate::resources::{bucket, database, dns_record, security_group, virtual_server};
use scp_cloud::{
    AttributeSchema, ConfigResolver, DataSourceHandler, ProviderBlock, Registration, Registry,
    ResolvedConfig, ResourceHandler, Result, Schema, Session,
};
use scp_profile::ProfileContext;
use serde_json::{Value, json};
use std::sync::Arc;

pub const PROVIDER_NAME: &str = "scp";

/// Every module contributing resource types or data sources
pub fn registrations() -> [Registration; 6] {
    [
        virtual_server::register,
        bucket::register,
        security_group::register,
        database::register,
        dns_record::register,
        virtual_servers::register,
    ]
}

pub fn provider_schema() -> Schema {
    Schema::new("Samsung SDS Cloud")
        .attribute(AttributeSchema::string("host").describe("API endpoint (SCP_TF_HOST)"))
        .attribute(AttributeSchema::string("project_id").describe("Project scope (SCP_TF_PROJECT_ID)"))
        .attribute(AttributeSchema::string("user_id"))
        .attribute(AttributeSchema::string("email"))
        .attribute(AttributeSchema::string("auth_method").describe("Only access-key is supported"))
        .attribute(AttributeSchema::string("access_key").sensitive())
        .attribute(AttributeSchema::string("secret_key").sensitive())
        .attribute(AttributeSchema::string("password").sensitive())
        .attribute(AttributeSchema::string("profile").describe("Profile section (SCP_TF_PROFILE)"))
}

#[derive(Clone)]
pub struct Provider {
    schema: Schema,
    registry: Arc<Registry>,
}

/// Build the provider and its dispatch tables
pub fn provider() -> Result<Provider> {
    let registry = Registry::from_registrations(&registrations())?;
    tracing::debug!(
        resources = ?registry.resource_names(),
        data_sources = ?registry.data_source_names(),
        "Provider initialized"
    );
    Ok(Provider {
        schema: provider_schema(),
        registry: Arc::new(registry),
    })
}

impl Provider {
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn resource(&self, name: &str) -> Result<Arc<dyn ResourceHandler>> {
        self.registry.resource(name)
    }

    pub fn data_source(&self, name: &str) -> Result<Arc<dyn DataSourceHandler>> {
        self.registry.data_source(name)
    }

    /// Merge the block with the environment and the profile files
    pub fn resolve(&self, block: &ProviderBlock) -> Result<ResolvedConfig> {
        let ctx = ProfileContext::new()?;
        resolve_with(block, &ctx)
    }

    /// Resolve the configuration and open an HTTP session
    #[tracing::instrument(skip_all)]
    pub fn configure(&self, block: &ProviderBlock) -> Result<Session> {
        let ctx = ProfileContext::new()?;
        let config = resolve_with(block, &ctx)?;
        ctx.ensure_lock_file();
        scp_cloud_http::connect(config)
    }

    /// Provider, resource and data source schemas as one JSON document
    pub fn schema_document(&self) -> Value {
        json!({
            "provider": self.schema,
            "resource_schemas": self.registry.resource_schemas(),
            "data_source_schemas": self.registry.data_source_schemas(),
        })
    }
}

/// Resolve against an explicit profile directory
pub fn resolve_with(block: &ProviderBlock, ctx: &ProfileContext) -> Result<ResolvedConfig> {
    ConfigResolver::discover(block, ctx).resolve(block)
}
