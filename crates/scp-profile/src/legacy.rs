//! Deprecated JSON profile layout
//!
//! Older tooling kept the same attributes as JSON under `<home>/.scp/`:
//!
//! ```text
//! <home>/.scp/config.json        {"host": ..., "project-id": ..., "user-id": ..., "email": ...}
//! <home>/.scp/credentials.json   {"auth-method": ..., "access-key": ..., "secret-key": ...}
//! ```
//!
//! The layout is read-only: nothing in this crate writes it.

use crate::error::{ProfileError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const LEGACY_DIR_NAME: &str = ".scp";
pub const LEGACY_CONFIG_FILE: &str = "config.json";
pub const LEGACY_CREDENTIALS_FILE: &str = "credentials.json";

/// Attributes found in the JSON layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LegacyProfile {
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
}

impl LegacyProfile {
    /// Look up an attribute by its kebab-case file key
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "host" => &self.host,
            "project-id" => &self.project_id,
            "user-id" => &self.user_id,
            "email" => &self.email,
            "auth-method" => &self.auth_method,
            "access-key" => &self.access_key,
            "secret-key" => &self.secret_key,
            _ => return None,
        };
        value.as_deref()
    }

    /// Fill every unset attribute from `other`
    pub fn merge_missing(&mut self, other: LegacyProfile) {
        fn fill(slot: &mut Option<String>, value: Option<String>) {
            if slot.as_deref().is_none_or(str::is_empty) {
                *slot = value.or(slot.take());
            }
        }

        fill(&mut self.host, other.host);
        fill(&mut self.project_id, other.project_id);
        fill(&mut self.user_id, other.user_id);
        fill(&mut self.email, other.email);
        fill(&mut self.auth_method, other.auth_method);
        fill(&mut self.access_key, other.access_key);
        fill(&mut self.secret_key, other.secret_key);
    }
}

/// Location of the JSON layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyLayout {
    dir: PathBuf,
}

impl LegacyLayout {
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(LEGACY_CONFIG_FILE)
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.dir.join(LEGACY_CREDENTIALS_FILE)
    }

    /// Read both JSON files; credentials take precedence on overlap
    ///
    /// Missing files contribute nothing. Malformed JSON is an error.
    pub fn load(&self) -> Result<LegacyProfile> {
        let mut profile = read_json(&self.credentials_path())?.unwrap_or_default();
        if let Some(config) = read_json(&self.config_path())? {
            profile.merge_missing(config);
        }
        Ok(profile)
    }
}

fn read_json(path: &Path) -> Result<Option<LegacyProfile>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| ProfileError::FileError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let profile = serde_json::from_str(&content)?;
    tracing::debug!(path = %path.display(), "Read legacy profile file");
    Ok(Some(profile))
}
