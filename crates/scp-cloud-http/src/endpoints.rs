//! Service domain endpoints

use crate::client::HttpBackend;
use async_trait::async_trait;
use reqwest::Method;
use scp_cloud::api::{
    Bucket, ComputeApi, CreateBucketRequest, CreateDatabaseRequest, CreateDnsRecordRequest,
    CreateSecurityGroupRequest, CreateSecurityGroupRuleRequest, CreateVirtualServerRequest,
    Database, DatabaseApi, DnsApi, DnsRecord, ListResponse, NetworkApi, ObjectStorageApi,
    SecurityGroup, SecurityGroupRule, UpdateDnsRecordRequest, VirtualServer,
};
use scp_cloud::{ApiResult, AsyncResponse};
use serde_json::json;

const VIRTUAL_SERVERS: [&str; 3] = ["virtual-server", "v2", "virtual-servers"];
const BUCKETS: [&str; 3] = ["object-storage", "v4", "buckets"];
const SECURITY_GROUPS: [&str; 3] = ["security-group", "v3", "security-groups"];
const DATABASES: [&str; 3] = ["database", "v3", "databases"];
const DNS_RECORDS: [&str; 3] = ["dns", "v2", "dns-records"];

fn path<'a>(base: &[&'a str], rest: &[&'a str]) -> Vec<&'a str> {
    base.iter().chain(rest).copied().collect()
}

#[async_trait]
impl ComputeApi for HttpBackend {
    async fn create_virtual_server(
        &self,
        request: &CreateVirtualServerRequest,
    ) -> ApiResult<AsyncResponse> {
        let req = self.request(Method::POST, &VIRTUAL_SERVERS)?.json(request);
        self.send(req).await
    }

    async fn get_virtual_server(&self, id: &str) -> ApiResult<VirtualServer> {
        let req = self.request(Method::GET, &path(&VIRTUAL_SERVERS, &[id]))?;
        self.send(req).await
    }

    async fn list_virtual_servers(&self) -> ApiResult<Vec<VirtualServer>> {
        let req = self.request(Method::GET, &VIRTUAL_SERVERS)?;
        let page: ListResponse<VirtualServer> = self.send(req).await?;
        Ok(page.contents)
    }

    async fn resize_virtual_server(
        &self,
        id: &str,
        server_type: &str,
    ) -> ApiResult<AsyncResponse> {
        let req = self
            .request(Method::PUT, &path(&VIRTUAL_SERVERS, &[id, "server-type"]))?
            .json(&json!({ "serverType": server_type }));
        self.send(req).await
    }

    async fn attach_security_group(
        &self,
        id: &str,
        security_group_id: &str,
    ) -> ApiResult<AsyncResponse> {
        let segments = path(&VIRTUAL_SERVERS, &[id, "security-groups", security_group_id]);
        let req = self.request(Method::POST, &segments)?;
        self.send(req).await
    }

    async fn detach_security_group(
        &self,
        id: &str,
        security_group_id: &str,
    ) -> ApiResult<AsyncResponse> {
        let segments = path(&VIRTUAL_SERVERS, &[id, "security-groups", security_group_id]);
        let req = self.request(Method::DELETE, &segments)?;
        self.send(req).await
    }

    async fn delete_virtual_server(&self, id: &str) -> ApiResult<()> {
        let req = self.request(Method::DELETE, &path(&VIRTUAL_SERVERS, &[id]))?;
        self.send_empty(req).await
    }
}

#[async_trait]
impl ObjectStorageApi for HttpBackend {
    async fn create_bucket(&self, request: &CreateBucketRequest) -> ApiResult<AsyncResponse> {
        let req = self.request(Method::POST, &BUCKETS)?.json(request);
        self.send(req).await
    }

    async fn get_bucket(&self, id: &str) -> ApiResult<Bucket> {
        let req = self.request(Method::GET, &path(&BUCKETS, &[id]))?;
        self.send(req).await
    }

    async fn set_bucket_versioning(&self, id: &str, enabled: bool) -> ApiResult<AsyncResponse> {
        let req = self
            .request(Method::PUT, &path(&BUCKETS, &[id, "versioning"]))?
            .json(&json!({ "versioningEnabled": enabled }));
        self.send(req).await
    }

    async fn delete_bucket(&self, id: &str) -> ApiResult<()> {
        let req = self.request(Method::DELETE, &path(&BUCKETS, &[id]))?;
        self.send_empty(req).await
    }
}

#[async_trait]
impl NetworkApi for HttpBackend {
    async fn create_security_group(
        &self,
        request: &CreateSecurityGroupRequest,
    ) -> ApiResult<AsyncResponse> {
        let req = self.request(Method::POST, &SECURITY_GROUPS)?.json(request);
        self.send(req).await
    }

    async fn get_security_group(&self, id: &str) -> ApiResult<SecurityGroup> {
        let req = self.request(Method::GET, &path(&SECURITY_GROUPS, &[id]))?;
        self.send(req).await
    }

    async fn update_security_group_description(
        &self,
        id: &str,
        description: &str,
    ) -> ApiResult<AsyncResponse> {
        let req = self
            .request(Method::PUT, &path(&SECURITY_GROUPS, &[id, "description"]))?
            .json(&json!({ "description": description }));
        self.send(req).await
    }

    async fn delete_security_group(&self, id: &str) -> ApiResult<()> {
        let req = self.request(Method::DELETE, &path(&SECURITY_GROUPS, &[id]))?;
        self.send_empty(req).await
    }

    async fn create_security_group_rule(
        &self,
        security_group_id: &str,
        request: &CreateSecurityGroupRuleRequest,
    ) -> ApiResult<AsyncResponse> {
        let segments = path(&SECURITY_GROUPS, &[security_group_id, "rules"]);
        let req = self.request(Method::POST, &segments)?.json(request);
        self.send(req).await
    }

    async fn get_security_group_rule(
        &self,
        security_group_id: &str,
        rule_id: &str,
    ) -> ApiResult<SecurityGroupRule> {
        let segments = path(&SECURITY_GROUPS, &[security_group_id, "rules", rule_id]);
        let req = self.request(Method::GET, &segments)?;
        self.send(req).await
    }

    async fn delete_security_group_rule(
        &self,
        security_group_id: &str,
        rule_id: &str,
    ) -> ApiResult<()> {
        let segments = path(&SECURITY_GROUPS, &[security_group_id, "rules", rule_id]);
        let req = self.request(Method::DELETE, &segments)?;
        self.send_empty(req).await
    }
}

#[async_trait]
impl DatabaseApi for HttpBackend {
    async fn create_database(&self, request: &CreateDatabaseRequest) -> ApiResult<AsyncResponse> {
        let req = self.request(Method::POST, &DATABASES)?.json(request);
        self.send(req).await
    }

    async fn get_database(&self, id: &str) -> ApiResult<Database> {
        let req = self.request(Method::GET, &path(&DATABASES, &[id]))?;
        self.send(req).await
    }

    async fn enable_disaster_recovery(&self, id: &str) -> ApiResult<AsyncResponse> {
        let req = self.request(Method::POST, &path(&DATABASES, &[id, "disaster-recovery"]))?;
        self.send(req).await
    }

    async fn modify_contract(&self, id: &str, contract_period: &str) -> ApiResult<AsyncResponse> {
        let req = self
            .request(Method::PUT, &path(&DATABASES, &[id, "contract"]))?
            .json(&json!({ "contractPeriod": contract_period }));
        self.send(req).await
    }

    async fn delete_database(&self, id: &str) -> ApiResult<()> {
        let req = self.request(Method::DELETE, &path(&DATABASES, &[id]))?;
        self.send_empty(req).await
    }
}

#[async_trait]
impl DnsApi for HttpBackend {
    async fn create_dns_record(
        &self,
        request: &CreateDnsRecordRequest,
    ) -> ApiResult<AsyncResponse> {
        let req = self.request(Method::POST, &DNS_RECORDS)?.json(request);
        self.send(req).await
    }

    async fn get_dns_record(&self, id: &str) -> ApiResult<DnsRecord> {
        let req = self.request(Method::GET, &path(&DNS_RECORDS, &[id]))?;
        self.send(req).await
    }

    async fn update_dns_record(
        &self,
        id: &str,
        request: &UpdateDnsRecordRequest,
    ) -> ApiResult<AsyncResponse> {
        let req = self
            .request(Method::PUT, &path(&DNS_RECORDS, &[id]))?
            .json(request);
        self.send(req).await
    }

    async fn delete_dns_record(&self, id: &str) -> ApiResult<()> {
        let req = self.request(Method::DELETE, &path(&DNS_RECORDS, &[id]))?;
        self.send_empty(req).await
    }
}
