//! Remote API surface
//!
//! One trait per service domain. The traits are implemented by the HTTP
//! binding in `scp-cloud-http` and by in-memory fakes in tests. Every call is
//! implicitly scoped by the project the session was built for.

pub mod compute;
pub mod database;
pub mod dns;
pub mod network;
pub mod storage;

pub use compute::{ComputeApi, CreateVirtualServerRequest, VirtualServer};
pub use database::{CreateDatabaseRequest, Database, DatabaseApi};
pub use dns::{CreateDnsRecordRequest, DnsApi, DnsRecord, UpdateDnsRecordRequest};
pub use network::{
    CreateSecurityGroupRequest, CreateSecurityGroupRuleRequest, NetworkApi, SecurityGroup,
    SecurityGroupRule,
};
pub use storage::{Bucket, CreateBucketRequest, ObjectStorageApi};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Failure reported by the remote API
///
/// `status` is the HTTP status when the request reached the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Failure that never produced an HTTP response
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(403, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    /// 404 or 403: the resource is gone or no longer visible to the project
    pub fn is_gone(&self) -> bool {
        matches!(self.status, Some(404) | Some(403))
    }

    pub fn has_status(&self, statuses: &[u16]) -> bool {
        self.status.is_some_and(|s| statuses.contains(&s))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {}: {}", status, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Acknowledgement of an asynchronous remote operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsyncResponse {
    pub resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl AsyncResponse {
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            request_id: None,
        }
    }
}

/// Paged list envelope used by list endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub contents: Vec<T>,
    #[serde(default)]
    pub total_count: usize,
}

/// A request flag that distinguishes "not sent" from `false`
///
/// Serializes as a plain bool when set. Fields of this type should carry
/// `#[serde(default, skip_serializing_if = "OptionalBool::is_unset")]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OptionalBool {
    #[default]
    Unset,
    Set(bool),
}

impl OptionalBool {
    pub fn set(&mut self, value: bool) {
        *self = OptionalBool::Set(value);
    }

    pub fn unset(&mut self) {
        *self = OptionalBool::Unset;
    }

    pub fn get(&self) -> Option<bool> {
        match self {
            OptionalBool::Set(value) => Some(*value),
            OptionalBool::Unset => None,
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, OptionalBool::Set(_))
    }

    pub fn is_unset(&self) -> bool {
        !self.is_set()
    }
}

impl From<Option<bool>> for OptionalBool {
    fn from(value: Option<bool>) -> Self {
        value.map_or(OptionalBool::Unset, OptionalBool::Set)
    }
}

impl From<bool> for OptionalBool {
    fn from(value: bool) -> Self {
        OptionalBool::Set(value)
    }
}

impl Serialize for OptionalBool {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OptionalBool::Set(value) => serializer.serialize_bool(*value),
            OptionalBool::Unset => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for OptionalBool {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<bool>::deserialize(deserializer).map(OptionalBool::from)
    }
}
