//! Provider configuration
//!
//! Attributes are resolved from three layers, first non-empty value wins:
//!
//! 1. the provider block passed by the host
//! 2. `SCP_TF_*` environment variables
//! 3. the on-disk profile (credentials file, then configurations file,
//!    then the deprecated JSON layout)

use crate::error::{CloudError, Result};
use scp_profile::{LegacyLayout, ProfileContext, ProfileSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Canonical service endpoint
pub const DEFAULT_HOST: &str = "https://openapi.samsungsdscloud.com";

/// Profile section used when none is selected
pub const DEFAULT_PROFILE: &str = "default";

/// Selects the profile section
pub const ENV_PROFILE: &str = "SCP_TF_PROFILE";

/// Default overall deadline of a create/update/delete operation
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Default sleep between two status polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// A resolvable provider attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Host,
    ProjectId,
    UserId,
    Email,
    AuthMethod,
    AccessKey,
    SecretKey,
}

impl Attribute {
    pub const ALL: [Attribute; 7] = [
        Attribute::Host,
        Attribute::ProjectId,
        Attribute::UserId,
        Attribute::Email,
        Attribute::AuthMethod,
        Attribute::AccessKey,
        Attribute::SecretKey,
    ];

    /// Name in the provider block
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Host => "host",
            Attribute::ProjectId => "project_id",
            Attribute::UserId => "user_id",
            Attribute::Email => "email",
            Attribute::AuthMethod => "auth_method",
            Attribute::AccessKey => "access_key",
            Attribute::SecretKey => "secret_key",
        }
    }

    pub fn env_var(self) -> &'static str {
        match self {
            Attribute::Host => "SCP_TF_HOST",
            Attribute::ProjectId => "SCP_TF_PROJECT_ID",
            Attribute::UserId => "SCP_TF_USER_ID",
            Attribute::Email => "SCP_TF_EMAIL",
            Attribute::AuthMethod => "SCP_TF_AUTH_METHOD",
            Attribute::AccessKey => "SCP_TF_ACCESS_KEY",
            Attribute::SecretKey => "SCP_TF_SECRET_KEY",
        }
    }

    /// Key in the profile files
    pub fn file_key(self) -> &'static str {
        match self {
            Attribute::Host => "host",
            Attribute::ProjectId => "project-id",
            Attribute::UserId => "user-id",
            Attribute::Email => "email",
            Attribute::AuthMethod => "auth-method",
            Attribute::AccessKey => "access-key",
            Attribute::SecretKey => "secret-key",
        }
    }

    pub fn is_secret(self) -> bool {
        matches!(self, Attribute::AccessKey | Attribute::SecretKey)
    }

    /// Look up by block name or file key
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|attr| attr.name() == name || attr.file_key() == name)
    }
}

/// Attributes the host passes in the provider block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    /// Accepted for compatibility; access-key authentication does not use it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Profile section supplying the file layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

impl ProviderBlock {
    pub fn get(&self, attr: Attribute) -> Option<&str> {
        let value = match attr {
            Attribute::Host => &self.host,
            Attribute::ProjectId => &self.project_id,
            Attribute::UserId => &self.user_id,
            Attribute::Email => &self.email,
            Attribute::AuthMethod => &self.auth_method,
            Attribute::AccessKey => &self.access_key,
            Attribute::SecretKey => &self.secret_key,
        };
        value.as_deref()
    }
}

/// Source of environment variables
pub trait EnvLookup {
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Profile section to use: block, then `SCP_TF_PROFILE`, then `default`
pub fn profile_name(block: &ProviderBlock, env: &impl EnvLookup) -> String {
    block
        .profile
        .clone()
        .filter(|p| !p.is_empty())
        .or_else(|| env.var(ENV_PROFILE).filter(|p| !p.is_empty()))
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
}

/// Section header of a profile; names already in brackets are kept
pub fn section_name(profile: &str) -> String {
    if profile.starts_with('[') && profile.ends_with(']') {
        profile.to_string()
    } else {
        format!("[{}]", profile)
    }
}

/// Values contributed by the on-disk profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileLayer {
    values: HashMap<String, String>,
}

impl FileLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect values from a loaded profile set
    ///
    /// Credentials are consulted before configurations. Within a file the
    /// selected `[profile]` section wins over entries outside any section.
    pub fn from_profiles(set: &ProfileSet, profile: &str) -> Self {
        let section = section_name(profile);
        let mut layer = Self::new();

        for file in [set.credentials(), set.configurations()].into_iter().flatten() {
            for name in [section.as_str(), ""] {
                let Some(props) = file.section(name) else {
                    continue;
                };
                for (key, value) in props.entries() {
                    layer.fill(key, value);
                }
            }
        }

        layer
    }

    /// Load the profile files of a context, falling back to the JSON layout
    #[tracing::instrument(skip(ctx, legacy), fields(config_dir = %ctx.config_dir().display()))]
    pub fn load(ctx: &ProfileContext, legacy: Option<&LegacyLayout>, profile: &str) -> Self {
        let mut layer = Self::from_profiles(&ctx.load_profiles(), profile);

        if let Some(legacy) = legacy {
            match legacy.load() {
                Ok(values) => {
                    for attr in Attribute::ALL {
                        if let Some(value) = values.get(attr.file_key()) {
                            layer.fill(attr.file_key(), value);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(dir = %legacy.dir().display(), error = %e, "Skipping legacy profile");
                }
            }
        }

        layer
    }

    /// Set a value unless one is already present; empty values are ignored
    pub fn fill(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        self.values
            .entry(key.to_string())
            .or_insert_with(|| value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Authentication method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMethod {
    #[default]
    AccessKey,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::AccessKey => "access-key",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMethod {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "access-key" => Ok(AuthMethod::AccessKey),
            other => Err(CloudError::UnsupportedAuth(other.to_string())),
        }
    }
}

/// Fully resolved client configuration
///
/// Read-only once built; shared by every handler through the session.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub host: String,
    pub project_id: String,
    pub user_id: String,
    pub email: String,
    pub login_id: String,
    pub auth_method: AuthMethod,
    pub access_key: String,
    pub secret_key: String,
}

impl ResolvedConfig {
    /// JSON view with secrets masked
    pub fn to_masked_json(&self) -> serde_json::Value {
        serde_json::json!({
            "host": self.host,
            "project_id": self.project_id,
            "user_id": self.user_id,
            "email": self.email,
            "login_id": self.login_id,
            "auth_method": self.auth_method.as_str(),
            "access_key": mask_secret(&self.access_key),
            "secret_key": mask_secret(&self.secret_key),
        })
    }
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("host", &self.host)
            .field("project_id", &self.project_id)
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("login_id", &self.login_id)
            .field("auth_method", &self.auth_method)
            .field("access_key", &mask_secret(&self.access_key))
            .field("secret_key", &mask_secret(&self.secret_key))
            .finish()
    }
}

/// Hide a secret, keeping only whether it is set
pub fn mask_secret(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}

/// Merges the three configuration layers
#[derive(Debug, Clone)]
pub struct ConfigResolver<E = ProcessEnv> {
    env: E,
    file: FileLayer,
}

impl ConfigResolver<ProcessEnv> {
    pub fn new(file: FileLayer) -> Self {
        Self::with_env(ProcessEnv, file)
    }

    /// Resolver reading the process environment and the profile directory
    pub fn discover(block: &ProviderBlock, ctx: &ProfileContext) -> Self {
        let profile = profile_name(block, &ProcessEnv);
        let legacy = ctx.legacy_layout();
        Self::new(FileLayer::load(ctx, legacy.as_ref(), &profile))
    }
}

impl<E: EnvLookup> ConfigResolver<E> {
    pub fn with_env(env: E, file: FileLayer) -> Self {
        Self { env, file }
    }

    /// First non-empty value of an attribute across the layers
    pub fn lookup(&self, block: &ProviderBlock, attr: Attribute) -> Option<String> {
        if let Some(value) = block.get(attr).filter(|v| !v.is_empty()) {
            return Some(value.to_string());
        }
        if let Some(value) = self.env.var(attr.env_var()).filter(|v| !v.is_empty()) {
            return Some(value);
        }
        self.file.get(attr.file_key()).map(str::to_string)
    }

    /// Produce the client configuration
    pub fn resolve(&self, block: &ProviderBlock) -> Result<ResolvedConfig> {
        let host = self
            .lookup(block, Attribute::Host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let project_id = self.require(block, Attribute::ProjectId)?;
        let user_id = self.require(block, Attribute::UserId)?;
        let email = self.require(block, Attribute::Email)?;

        let auth_method = match self.lookup(block, Attribute::AuthMethod) {
            Some(method) => method.parse()?,
            None => AuthMethod::default(),
        };

        if block.password.as_deref().is_some_and(|p| !p.is_empty()) {
            tracing::debug!("Ignoring password attribute for access-key authentication");
        }

        let config = ResolvedConfig {
            host,
            login_id: email.clone(),
            project_id,
            user_id,
            email,
            auth_method,
            access_key: self.lookup(block, Attribute::AccessKey).unwrap_or_default(),
            secret_key: self.lookup(block, Attribute::SecretKey).unwrap_or_default(),
        };

        tracing::debug!(
            host = %config.host,
            project_id = %config.project_id,
            "Resolved provider configuration"
        );
        Ok(config)
    }

    fn require(&self, block: &ProviderBlock, attr: Attribute) -> Result<String> {
        self.lookup(block, attr)
            .ok_or_else(|| CloudError::ConfigMissing(attr.name().to_string()))
    }
}
