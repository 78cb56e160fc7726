//! DNS record API

use super::{ApiResult, AsyncResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsRecord {
    #[serde(rename = "dnsRecordId")]
    pub id: String,
    #[serde(rename = "dnsRecordState")]
    pub state: String,
    pub dns_domain_id: String,
    pub record_name: String,
    pub record_type: String,
    pub record_value: String,
    pub ttl: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDnsRecordRequest {
    pub dns_domain_id: String,
    pub record_name: String,
    pub record_type: String,
    pub record_value: String,
    pub ttl: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDnsRecordRequest {
    pub record_value: String,
    pub ttl: u32,
}

#[async_trait]
pub trait DnsApi: Send + Sync {
    async fn create_dns_record(&self, request: &CreateDnsRecordRequest)
    -> ApiResult<AsyncResponse>;

    async fn get_dns_record(&self, id: &str) -> ApiResult<DnsRecord>;

    async fn update_dns_record(
        &self,
        id: &str,
        request: &UpdateDnsRecordRequest,
    ) -> ApiResult<AsyncResponse>;

    async fn delete_dns_record(&self, id: &str) -> ApiResult<()>;
}
