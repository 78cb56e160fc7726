//! Untyped attribute bag exchanged with the host
//!
//! Handlers work on one typed struct per resource; [`ResourceData`] is the
//! only place attributes are dynamically typed.

use crate::error::{CloudError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    /// Canonical identity; empty when the resource is unknown or vanished
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl ResourceData {
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self {
            id: String::new(),
            attributes,
        }
    }

    /// Build from a JSON object; anything else is rejected
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(attributes) => Ok(Self::new(attributes)),
            other => Err(CloudError::invalid_input(
                "",
                format!("expected an attribute object, got {}", other),
            )),
        }
    }

    pub fn from_model<M: Serialize>(id: impl Into<String>, model: &M) -> Result<Self> {
        let mut data = Self::from_value(serde_json::to_value(model)?)?;
        data.id = id.into();
        Ok(data)
    }

    pub fn to_model<M: DeserializeOwned>(&self) -> Result<M> {
        serde_json::from_value(Value::Object(self.attributes.clone()))
            .map_err(|e| CloudError::invalid_input("", e.to_string()))
    }

    /// State reported for a resource deleted outside the host
    pub fn vanished() -> Self {
        Self::default()
    }

    pub fn is_gone(&self) -> bool {
        self.id.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }
}
