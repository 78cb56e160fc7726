//! Managed database API

use super::{ApiResult, AsyncResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    #[serde(rename = "databaseId")]
    pub id: String,
    #[serde(rename = "databaseName")]
    pub name: String,
    #[serde(rename = "databaseState")]
    pub state: String,
    pub engine: String,
    pub engine_version: String,
    pub contract_period: String,
    #[serde(default)]
    pub subnet_id: String,
    #[serde(default)]
    pub dr_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatabaseRequest {
    pub database_name: String,
    pub engine: String,
    pub engine_version: String,
    pub contract_period: String,
    pub subnet_id: String,
}

#[async_trait]
pub trait DatabaseApi: Send + Sync {
    async fn create_database(&self, request: &CreateDatabaseRequest) -> ApiResult<AsyncResponse>;

    async fn get_database(&self, id: &str) -> ApiResult<Database>;

    /// Enable disaster recovery replication for an existing database
    async fn enable_disaster_recovery(&self, id: &str) -> ApiResult<AsyncResponse>;

    async fn modify_contract(&self, id: &str, contract_period: &str) -> ApiResult<AsyncResponse>;

    async fn delete_database(&self, id: &str) -> ApiResult<()>;
}
