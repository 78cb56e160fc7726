//! Virtual server API

use super::{ApiResult, AsyncResponse, OptionalBool};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Virtual server as returned by the detail and list endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualServer {
    #[serde(rename = "virtualServerId")]
    pub id: String,
    #[serde(rename = "virtualServerName")]
    pub name: String,
    #[serde(rename = "virtualServerState")]
    pub state: String,
    pub server_type: String,
    pub image_id: String,
    #[serde(default)]
    pub security_group_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default)]
    pub delete_protection_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVirtualServerRequest {
    pub virtual_server_name: String,
    pub server_type: String,
    pub image_id: String,
    #[serde(default)]
    pub security_group_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "OptionalBool::is_unset")]
    pub delete_protection: OptionalBool,
}

#[async_trait]
pub trait ComputeApi: Send + Sync {
    async fn create_virtual_server(
        &self,
        request: &CreateVirtualServerRequest,
    ) -> ApiResult<AsyncResponse>;

    async fn get_virtual_server(&self, id: &str) -> ApiResult<VirtualServer>;

    async fn list_virtual_servers(&self) -> ApiResult<Vec<VirtualServer>>;

    /// Change the server type (CPU/memory shape)
    async fn resize_virtual_server(&self, id: &str, server_type: &str)
    -> ApiResult<AsyncResponse>;

    async fn attach_security_group(
        &self,
        id: &str,
        security_group_id: &str,
    ) -> ApiResult<AsyncResponse>;

    async fn detach_security_group(
        &self,
        id: &str,
        security_group_id: &str,
    ) -> ApiResult<AsyncResponse>;

    async fn delete_virtual_server(&self, id: &str) -> ApiResult<()>;
}
