//! Resource dispatch table
//!
//! Resource modules expose a [`Registration`] function. The provider walks
//! its list of registrations once at startup; the resulting [`Registry`] is
//! immutable and shared by every operation.

use crate::data::ResourceData;
use crate::error::{CloudError, Result};
use crate::lifecycle::{DataSource, DataSourceAdapter, Lifecycle, OperationContext, ResourceAdapter};
use crate::schema::Schema;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Operations the host can invoke on a managed resource type
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    fn schema(&self) -> Schema;

    async fn create(&self, ctx: &OperationContext, planned: ResourceData) -> Result<ResourceData>;

    /// Current state; an empty id means the resource was deleted externally
    async fn read(&self, ctx: &OperationContext, id: &str) -> Result<ResourceData>;

    async fn update(
        &self,
        ctx: &OperationContext,
        prior: &ResourceData,
        planned: ResourceData,
    ) -> Result<ResourceData>;

    async fn delete(&self, ctx: &OperationContext, id: &str) -> Result<()>;

    /// Adopt an existing remote resource by id
    async fn import(&self, ctx: &OperationContext, id: &str) -> Result<ResourceData>;
}

#[async_trait]
pub trait DataSourceHandler: Send + Sync {
    fn schema(&self) -> Schema;

    async fn read(&self, ctx: &OperationContext, args: ResourceData) -> Result<ResourceData>;
}

/// Adds a module's resource types and data sources to the builder
pub type Registration = fn(&mut RegistryBuilder) -> Result<()>;

#[derive(Default)]
pub struct RegistryBuilder {
    resources: BTreeMap<String, Arc<dyn ResourceHandler>>,
    data_sources: BTreeMap<String, Arc<dyn DataSourceHandler>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resource(
        &mut self,
        name: &str,
        handler: Arc<dyn ResourceHandler>,
    ) -> Result<&mut Self> {
        if self.resources.contains_key(name) {
            return Err(CloudError::DuplicateRegistration(name.to_string()));
        }
        tracing::debug!(resource = name, "Registered resource type");
        self.resources.insert(name.to_string(), handler);
        Ok(self)
    }

    /// Register a typed lifecycle behind the reconciliation adapter
    pub fn lifecycle<L: Lifecycle>(&mut self, name: &str, lifecycle: L) -> Result<&mut Self> {
        self.resource(name, Arc::new(ResourceAdapter::new(lifecycle)))
    }

    pub fn data_source(
        &mut self,
        name: &str,
        handler: Arc<dyn DataSourceHandler>,
    ) -> Result<&mut Self> {
        if self.data_sources.contains_key(name) {
            return Err(CloudError::DuplicateRegistration(name.to_string()));
        }
        tracing::debug!(data_source = name, "Registered data source");
        self.data_sources.insert(name.to_string(), handler);
        Ok(self)
    }

    pub fn typed_data_source<D: DataSource>(&mut self, name: &str, source: D) -> Result<&mut Self> {
        self.data_source(name, Arc::new(DataSourceAdapter::new(source)))
    }

    /// Run each registration function in order
    pub fn register_all(&mut self, registrations: &[Registration]) -> Result<&mut Self> {
        for register in registrations {
            register(self)?;
        }
        Ok(self)
    }

    pub fn build(self) -> Registry {
        tracing::debug!(
            resources = self.resources.len(),
            data_sources = self.data_sources.len(),
            "Built resource registry"
        );
        Registry {
            resources: self.resources,
            data_sources: self.data_sources,
        }
    }
}

/// Immutable dispatch table
#[derive(Clone, Default)]
pub struct Registry {
    resources: BTreeMap<String, Arc<dyn ResourceHandler>>,
    data_sources: BTreeMap<String, Arc<dyn DataSourceHandler>>,
}

impl Registry {
    pub fn from_registrations(registrations: &[Registration]) -> Result<Self> {
        let mut builder = RegistryBuilder::new();
        builder.register_all(registrations)?;
        Ok(builder.build())
    }

    pub fn resource(&self, name: &str) -> Result<Arc<dyn ResourceHandler>> {
        self.resources
            .get(name)
            .cloned()
            .ok_or_else(|| CloudError::UnknownResourceType(name.to_string()))
    }

    pub fn data_source(&self, name: &str) -> Result<Arc<dyn DataSourceHandler>> {
        self.data_sources
            .get(name)
            .cloned()
            .ok_or_else(|| CloudError::UnknownResourceType(name.to_string()))
    }

    /// Registered resource type names, sorted
    pub fn resource_names(&self) -> Vec<&str> {
        self.resources.keys().map(String::as_str).collect()
    }

    pub fn data_source_names(&self) -> Vec<&str> {
        self.data_sources.keys().map(String::as_str).collect()
    }

    pub fn resource_schemas(&self) -> BTreeMap<String, Schema> {
        self.resources
            .iter()
            .map(|(name, handler)| (name.clone(), handler.schema()))
            .collect()
    }

    pub fn data_source_schemas(&self) -> BTreeMap<String, Schema> {
        self.data_sources
            .iter()
            .map(|(name, handler)| (name.clone(), handler.schema()))
            .collect()
    }
}
