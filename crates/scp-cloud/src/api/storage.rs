//! Object storage API

use super::{ApiResult, AsyncResponse, OptionalBool};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    #[serde(rename = "objectStorageBucketId")]
    pub id: String,
    #[serde(rename = "objectStorageBucketName")]
    pub name: String,
    #[serde(rename = "objectStorageBucketState")]
    pub state: String,
    pub object_storage_id: String,
    #[serde(default)]
    pub versioning_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBucketRequest {
    pub object_storage_bucket_name: String,
    pub object_storage_id: String,
    /// Left out of the request when unset so the service default applies
    #[serde(default, skip_serializing_if = "OptionalBool::is_unset")]
    pub versioning_enabled: OptionalBool,
}

#[async_trait]
pub trait ObjectStorageApi: Send + Sync {
    async fn create_bucket(&self, request: &CreateBucketRequest) -> ApiResult<AsyncResponse>;

    async fn get_bucket(&self, id: &str) -> ApiResult<Bucket>;

    async fn set_bucket_versioning(&self, id: &str, enabled: bool) -> ApiResult<AsyncResponse>;

    async fn delete_bucket(&self, id: &str) -> ApiResult<()>;
}
