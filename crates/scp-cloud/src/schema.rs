//! Attribute schemas and validators
//!
//! Planned attributes are checked against the schema before any remote call
//! is made. Failures name the offending attribute path.

use crate::error::{CloudError, Result};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};

const IPV4_PATTERN: &str = r"^((25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.){3}(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])$";
const BUCKET_NAME_PATTERN: &str = r"^[a-z0-9][a-z0-9.-]{1,61}[a-z0-9]$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Int,
    Bool,
    StringList,
    /// Computed nested objects, e.g. data source results
    ObjectList,
}

impl AttributeType {
    fn accepts(self, value: &Value) -> bool {
        match self {
            AttributeType::String => value.is_string(),
            AttributeType::Int => value.is_i64() || value.is_u64(),
            AttributeType::Bool => value.is_boolean(),
            AttributeType::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            AttributeType::ObjectList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_object)),
        }
    }
}

/// Compile a pattern once per process
fn compiled(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    static CACHE: LazyLock<Mutex<HashMap<String, Regex>>> = LazyLock::new(Default::default);

    let mut cache = CACHE.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(regex) = cache.get(pattern) {
        return Ok(regex.clone());
    }
    let regex = Regex::new(pattern)?;
    cache.insert(pattern.to_string(), regex.clone());
    Ok(regex)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Validator {
    /// String must match a regular expression
    Pattern { description: String, pattern: String },
    /// String must be one of a fixed set
    OneOf { values: Vec<String> },
    /// Integer must lie within `min..=max`
    IntRange { min: i64, max: i64 },
}

impl Validator {
    pub fn pattern(description: impl Into<String>, pattern: impl Into<String>) -> Self {
        Validator::Pattern {
            description: description.into(),
            pattern: pattern.into(),
        }
    }

    pub fn ipv4() -> Self {
        Self::pattern("an IPv4 address", IPV4_PATTERN)
    }

    /// 3-63 characters of lowercase letters, digits, dots and hyphens
    pub fn bucket_name() -> Self {
        Self::pattern("a valid bucket name", BUCKET_NAME_PATTERN)
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Validator::OneOf {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn int_range(min: i64, max: i64) -> Self {
        Validator::IntRange { min, max }
    }

    /// Check a non-null value
    pub fn check(&self, path: &str, value: &Value) -> Result<()> {
        match self {
            Validator::Pattern {
                description,
                pattern,
            } => {
                let text = expect_str(path, value)?;
                let regex = compiled(pattern).map_err(|e| {
                    CloudError::InvalidConfig(format!("invalid pattern for '{}': {}", path, e))
                })?;
                if !regex.is_match(text) {
                    return Err(CloudError::invalid_input(
                        path,
                        format!("'{}' is not {}", text, description),
                    ));
                }
            }
            Validator::OneOf { values } => {
                let text = expect_str(path, value)?;
                if !values.iter().any(|v| v == text) {
                    return Err(CloudError::invalid_input(
                        path,
                        format!("'{}' must be one of: {}", text, values.join(", ")),
                    ));
                }
            }
            Validator::IntRange { min, max } => {
                let number = value
                    .as_i64()
                    .ok_or_else(|| CloudError::invalid_input(path, "expected an integer"))?;
                if number < *min || number > *max {
                    return Err(CloudError::invalid_input(
                        path,
                        format!("{} is outside {}..={}", number, min, max),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn expect_str<'a>(path: &str, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| CloudError::invalid_input(path, "expected a string"))
}

/// Description of one attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub required: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub force_new: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            description: String::new(),
            required: false,
            computed: false,
            sensitive: false,
            force_new: false,
            default: None,
            validators: Vec::new(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, AttributeType::String)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, AttributeType::Int)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, AttributeType::Bool)
    }

    pub fn string_list(name: impl Into<String>) -> Self {
        Self::new(name, AttributeType::StringList)
    }

    pub fn object_list(name: impl Into<String>) -> Self {
        Self::new(name, AttributeType::ObjectList)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set by the remote service, never by the user
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Changing the attribute replaces the resource
    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn validate_with(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn is_optional(&self) -> bool {
        !self.required && !self.computed
    }

    fn check(&self, value: Option<&Value>) -> Result<()> {
        let value = match value {
            None | Some(Value::Null) => {
                if self.required {
                    return Err(CloudError::invalid_input(&self.name, "required attribute is missing"));
                }
                return Ok(());
            }
            Some(value) => value,
        };

        if !self.attr_type.accepts(value) {
            return Err(CloudError::invalid_input(
                &self.name,
                format!("expected {:?}, got {}", self.attr_type, value),
            ));
        }

        for validator in &self.validators {
            validator.check(&self.name, value)?;
        }
        Ok(())
    }
}

/// Schema of a resource, a data source or the provider block
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    pub version: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub attributes: Vec<AttributeSchema>,
}

impl Schema {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            version: 0,
            description: description.into(),
            attributes: Vec::new(),
        }
    }

    pub fn attribute(mut self, attribute: AttributeSchema) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Check planned attributes: no unknown names, required present, types and validators
    pub fn validate(&self, attributes: &Map<String, Value>) -> Result<()> {
        if let Some(unknown) = attributes.keys().find(|name| self.get(name).is_none()) {
            return Err(CloudError::invalid_input(unknown.as_str(), "unknown attribute"));
        }

        for attribute in &self.attributes {
            attribute.check(attributes.get(&attribute.name))?;
        }
        Ok(())
    }

    /// Insert declared defaults for absent attributes
    pub fn apply_defaults(&self, attributes: &mut Map<String, Value>) {
        for attribute in &self.attributes {
            if let Some(default) = &attribute.default
                && attributes.get(&attribute.name).is_none_or(Value::is_null)
            {
                attributes.insert(attribute.name.clone(), default.clone());
            }
        }
    }

    /// Force-new attributes whose planned value differs from the prior state
    ///
    /// Absent and null are the same value, so dropping a previously set
    /// attribute from the plan is a change too.
    pub fn requires_replacement(
        &self,
        prior: &Map<String, Value>,
        planned: &Map<String, Value>,
    ) -> Vec<String> {
        fn value<'a>(map: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
            map.get(name).filter(|v| !v.is_null())
        }

        self.attributes
            .iter()
            .filter(|a| a.force_new && !a.computed)
            .filter(|a| value(prior, &a.name) != value(planned, &a.name))
            .map(|a| a.name.clone())
            .collect()
    }
}
