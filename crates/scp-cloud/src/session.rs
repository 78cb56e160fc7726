//! Authenticated client session
//!
//! A [`Session`] bundles the resolved configuration with one sub-client per
//! service domain. It is cheap to clone and read-only after construction, so
//! handlers running in parallel share a single instance.

use crate::api::{ComputeApi, DatabaseApi, DnsApi, NetworkApi, ObjectStorageApi};
use crate::config::{AuthMethod, ResolvedConfig};
use crate::error::{CloudError, Result};
use std::fmt;
use std::sync::Arc;

/// Every domain API at once, for bindings that serve all of them
pub trait CloudBackend:
    ComputeApi + ObjectStorageApi + NetworkApi + DatabaseApi + DnsApi + 'static
{
}

impl<T> CloudBackend for T where
    T: ComputeApi + ObjectStorageApi + NetworkApi + DatabaseApi + DnsApi + 'static
{
}

#[derive(Clone)]
pub struct Session {
    config: Arc<ResolvedConfig>,
    compute: Arc<dyn ComputeApi>,
    storage: Arc<dyn ObjectStorageApi>,
    network: Arc<dyn NetworkApi>,
    database: Arc<dyn DatabaseApi>,
    dns: Arc<dyn DnsApi>,
}

impl Session {
    pub fn builder(config: ResolvedConfig) -> SessionBuilder {
        SessionBuilder::new(config)
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Project every remote call is scoped by
    pub fn project_id(&self) -> &str {
        &self.config.project_id
    }

    pub fn compute(&self) -> &dyn ComputeApi {
        self.compute.as_ref()
    }

    pub fn storage(&self) -> &dyn ObjectStorageApi {
        self.storage.as_ref()
    }

    pub fn network(&self) -> &dyn NetworkApi {
        self.network.as_ref()
    }

    pub fn database(&self) -> &dyn DatabaseApi {
        self.database.as_ref()
    }

    pub fn dns(&self) -> &dyn DnsApi {
        self.dns.as_ref()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builds a [`Session`] from a resolved configuration
pub struct SessionBuilder {
    config: ResolvedConfig,
    compute: Option<Arc<dyn ComputeApi>>,
    storage: Option<Arc<dyn ObjectStorageApi>>,
    network: Option<Arc<dyn NetworkApi>>,
    database: Option<Arc<dyn DatabaseApi>>,
    dns: Option<Arc<dyn DnsApi>>,
}

impl SessionBuilder {
    pub fn new(config: ResolvedConfig) -> Self {
        Self {
            config,
            compute: None,
            storage: None,
            network: None,
            database: None,
            dns: None,
        }
    }

    /// Use one binding for every service domain
    pub fn with_backend<B: CloudBackend>(self, backend: Arc<B>) -> Self {
        self.compute(backend.clone())
            .storage(backend.clone())
            .network(backend.clone())
            .database(backend.clone())
            .dns(backend)
    }

    pub fn compute(mut self, client: Arc<dyn ComputeApi>) -> Self {
        self.compute = Some(client);
        self
    }

    pub fn storage(mut self, client: Arc<dyn ObjectStorageApi>) -> Self {
        self.storage = Some(client);
        self
    }

    pub fn network(mut self, client: Arc<dyn NetworkApi>) -> Self {
        self.network = Some(client);
        self
    }

    pub fn database(mut self, client: Arc<dyn DatabaseApi>) -> Self {
        self.database = Some(client);
        self
    }

    pub fn dns(mut self, client: Arc<dyn DnsApi>) -> Self {
        self.dns = Some(client);
        self
    }

    /// Validate the configuration and assemble the session
    pub fn build(self) -> Result<Session> {
        validate(&self.config)?;

        let missing = |domain: &str| CloudError::InvalidConfig(format!("no {} client configured", domain));
        let session = Session {
            compute: self.compute.ok_or_else(|| missing("compute"))?,
            storage: self.storage.ok_or_else(|| missing("object storage"))?,
            network: self.network.ok_or_else(|| missing("network"))?,
            database: self.database.ok_or_else(|| missing("database"))?,
            dns: self.dns.ok_or_else(|| missing("dns"))?,
            config: Arc::new(self.config),
        };

        tracing::info!(
            host = %session.config.host,
            project_id = %session.config.project_id,
            auth_method = %session.config.auth_method,
            "Session established"
        );
        Ok(session)
    }
}

/// Checks the session builder applies before any client is used
pub fn validate(config: &ResolvedConfig) -> Result<()> {
    validate_host(&config.host)?;

    match config.auth_method {
        AuthMethod::AccessKey => {
            if config.access_key.is_empty() {
                return Err(CloudError::ConfigMissing("access_key".to_string()));
            }
            if config.secret_key.is_empty() {
                return Err(CloudError::ConfigMissing("secret_key".to_string()));
            }
        }
    }

    Ok(())
}

/// The host must be an absolute http(s) URL
fn validate_host(host: &str) -> Result<()> {
    let rest = host
        .strip_prefix("https://")
        .or_else(|| host.strip_prefix("http://"))
        .ok_or_else(|| CloudError::invalid_input("host", "must start with http:// or https://"))?;

    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if authority.is_empty() || authority.contains(char::is_whitespace) {
        return Err(CloudError::invalid_input("host", format!("'{}' has no valid host name", host)));
    }

    Ok(())
}
