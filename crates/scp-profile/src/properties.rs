//! Named key/value property groups

use crate::error::{ProfileError, Result};
use std::collections::HashMap;

/// Splits a `key=value` line.
///
/// The line must contain exactly one `=` and a non-empty key.
pub fn split_line(line: &str) -> Result<(&str, &str)> {
    let mut parts = line.split('=');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(value), None) if !key.is_empty() => Ok((key, value)),
        _ => Err(ProfileError::InvalidInput(line.to_string())),
    }
}

/// Rejects keys and values the codec could not read back.
///
/// Keys must be non-empty; neither side may hold `=` or a line break.
pub fn check_kv(key: &str, value: &str) -> Result<()> {
    let unsafe_char = |s: &str| s.contains(['=', '\n', '\r']);
    if key.is_empty() || unsafe_char(key) || unsafe_char(value) {
        return Err(ProfileError::InvalidInput(format!("{}={}", key, value)));
    }
    Ok(())
}

/// A named mapping from string key to string value
///
/// The name is only used for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    name: String,
    values: HashMap<String, String>,
}

impl Properties {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a property from a `key=value` line, overwriting any prior value
    pub fn add(&mut self, line: &str) -> Result<()> {
        let (key, value) = split_line(line)?;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Insert or overwrite a key, see [`check_kv`]
    pub fn add_kv(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let (key, value) = (key.into(), value.into());
        check_kv(&key, &value)?;
        self.values.insert(key, value);
        Ok(())
    }

    /// Remove a key. Absent keys are ignored.
    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries sorted by key
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .values
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}
