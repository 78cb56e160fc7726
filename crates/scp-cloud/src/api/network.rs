//! Security group API

use super::{ApiResult, AsyncResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroup {
    #[serde(rename = "securityGroupId")]
    pub id: String,
    #[serde(rename = "securityGroupName")]
    pub name: String,
    #[serde(rename = "securityGroupState")]
    pub state: String,
    pub vpc_id: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSecurityGroupRequest {
    pub security_group_name: String,
    pub vpc_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroupRule {
    #[serde(rename = "ruleId")]
    pub id: String,
    #[serde(rename = "ruleState")]
    pub state: String,
    pub direction: String,
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub remote_ip_prefix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSecurityGroupRuleRequest {
    pub direction: String,
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub remote_ip_prefix: String,
}

#[async_trait]
pub trait NetworkApi: Send + Sync {
    async fn create_security_group(
        &self,
        request: &CreateSecurityGroupRequest,
    ) -> ApiResult<AsyncResponse>;

    async fn get_security_group(&self, id: &str) -> ApiResult<SecurityGroup>;

    async fn update_security_group_description(
        &self,
        id: &str,
        description: &str,
    ) -> ApiResult<AsyncResponse>;

    async fn delete_security_group(&self, id: &str) -> ApiResult<()>;

    async fn create_security_group_rule(
        &self,
        security_group_id: &str,
        request: &CreateSecurityGroupRuleRequest,
    ) -> ApiResult<AsyncResponse>;

    async fn get_security_group_rule(
        &self,
        security_group_id: &str,
        rule_id: &str,
    ) -> ApiResult<SecurityGroupRule>;

    async fn delete_security_group_rule(
        &self,
        security_group_id: &str,
        rule_id: &str,
    ) -> ApiResult<()>;
}
