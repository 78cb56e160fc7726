//! Profiles and profile sets
//!
//! A [`Profile`] groups [`Properties`] by section name; a [`ProfileSet`]
//! groups profiles by logical file name (`credentials`, `configurations`).

use crate::error::{ProfileError, Result};
use crate::properties::{Properties, check_kv, split_line};
use std::collections::HashMap;

/// Logical name of the credentials file
pub const CREDENTIALS: &str = "credentials";

/// Logical name of the configurations file
pub const CONFIGURATIONS: &str = "configurations";

/// A named mapping from section name to [`Properties`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    name: String,
    sections: HashMap<String, Properties>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sections: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a `key=value` line to a section, creating the section if absent
    ///
    /// The line is validated before the section is created, so a rejected
    /// line never leaves an empty section behind.
    pub fn add_property(&mut self, section: &str, line: &str) -> Result<()> {
        let (key, value) = split_line(line)?;
        self.section_entry(section).add_kv(key, value)
    }

    /// Set a single key in a section, creating the section if absent
    pub fn set(&mut self, section: &str, key: &str, value: &str) -> Result<()> {
        check_kv(key, value)?;
        self.section_entry(section).add_kv(key, value)
    }

    /// Remove a single key from a section; absent sections and keys are ignored
    pub fn unset(&mut self, section: &str, key: &str) {
        if let Some(props) = self.sections.get_mut(section) {
            props.remove(key);
        }
    }

    /// Remove a whole section
    pub fn remove_property(&mut self, section: &str) -> Result<Properties> {
        self.sections
            .remove(section)
            .ok_or_else(|| ProfileError::NotFound(section.to_string()))
    }

    pub fn clear(&mut self) {
        self.sections.clear();
    }

    pub fn section(&self, section: &str) -> Option<&Properties> {
        self.sections.get(section)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections.get(section).and_then(|props| props.get(key))
    }

    pub fn contains_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Section names sorted lexicographically
    pub fn section_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sections.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    fn section_entry(&mut self, section: &str) -> &mut Properties {
        self.sections
            .entry(section.to_string())
            .or_insert_with(|| Properties::new(section))
    }
}

/// A named mapping from logical file name to [`Profile`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSet {
    name: String,
    profiles: HashMap<String, Profile>,
}

impl ProfileSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            profiles: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn insert(&mut self, logical_name: impl Into<String>, profile: Profile) {
        self.profiles.insert(logical_name.into(), profile);
    }

    pub fn get(&self, logical_name: &str) -> Option<&Profile> {
        self.profiles.get(logical_name)
    }

    pub fn remove(&mut self, logical_name: &str) -> Option<Profile> {
        self.profiles.remove(logical_name)
    }

    pub fn credentials(&self) -> Option<&Profile> {
        self.get(CREDENTIALS)
    }

    pub fn configurations(&self) -> Option<&Profile> {
        self.get(CONFIGURATIONS)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
