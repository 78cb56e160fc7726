//! `scp_dns_record`

use async_trait::async_trait;
use scp_cloud::api::{CreateDnsRecordRequest, DnsRecord, UpdateDnsRecordRequest};
use scp_cloud::{
    ApiResult, AttributeSchema, Lifecycle, OperationContext, RegistryBuilder, Result, Schema,
    Validator, wait_for,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const RESOURCE_TYPE: &str = "scp_dns_record";

pub const RECORD_TYPES: [&str; 6] = ["A", "AAAA", "CNAME", "MX", "TXT", "NS"];

const DEFAULT_TTL: u32 = 300;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DnsRecordModel {
    pub dns_domain_id: String,
    pub record_name: String,
    pub record_type: String,
    pub record_value: String,
    #[serde(default = "default_ttl")]
    pub ttl: u32,
    #[serde(default)]
    pub state: Option<String>,
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

impl DnsRecordModel {
    /// `A` records must point at an IPv4 address
    fn check_value(&self) -> Result<()> {
        if self.record_type == "A" {
            Validator::ipv4().check("record_value", &Value::from(self.record_value.as_str()))?;
        }
        Ok(())
    }
}

impl From<DnsRecord> for DnsRecordModel {
    fn from(record: DnsRecord) -> Self {
        Self {
            dns_domain_id: record.dns_domain_id,
            record_name: record.record_name,
            record_type: record.record_type,
            record_value: record.record_value,
            ttl: record.ttl,
            state: Some(record.state),
        }
    }
}

pub struct DnsRecordResource;

#[async_trait]
impl Lifecycle for DnsRecordResource {
    type Model = DnsRecordModel;

    fn schema(&self) -> Schema {
        Schema::new("DNS record")
            .attribute(AttributeSchema::string("dns_domain_id").required().force_new())
            .attribute(AttributeSchema::string("record_name").required().force_new())
            .attribute(
                AttributeSchema::string("record_type")
                    .required()
                    .force_new()
                    .validate_with(Validator::one_of(RECORD_TYPES)),
            )
            .attribute(AttributeSchema::string("record_value").required())
            .attribute(
                AttributeSchema::int("ttl")
                    .default_value(DEFAULT_TTL)
                    .validate_with(Validator::int_range(60, 86400)),
            )
            .attribute(AttributeSchema::string("state").computed())
    }

    async fn create(&self, ctx: &OperationContext, model: &DnsRecordModel) -> Result<String> {
        model.check_value()?;

        let request = CreateDnsRecordRequest {
            dns_domain_id: model.dns_domain_id.clone(),
            record_name: model.record_name.clone(),
            record_type: model.record_type.clone(),
            record_value: model.record_value.clone(),
            ttl: model.ttl,
        };
        let response = ctx.call(ctx.session.dns().create_dns_record(&request)).await?;
        Ok(response.resource_id)
    }

    async fn read(&self, ctx: &OperationContext, id: &str) -> Result<DnsRecordModel> {
        let record = ctx.call(ctx.session.dns().get_dns_record(id)).await?;
        Ok(record.into())
    }

    async fn status(&self, ctx: &OperationContext, id: &str) -> ApiResult<String> {
        Ok(ctx.session.dns().get_dns_record(id).await?.state)
    }

    async fn update(
        &self,
        ctx: &OperationContext,
        id: &str,
        prior: &DnsRecordModel,
        planned: &DnsRecordModel,
    ) -> Result<()> {
        planned.check_value()?;

        if prior.record_value != planned.record_value || prior.ttl != planned.ttl {
            let request = UpdateDnsRecordRequest {
                record_value: planned.record_value.clone(),
                ttl: planned.ttl,
            };
            ctx.call(ctx.session.dns().update_dns_record(id, &request))
                .await?;
            wait_for(self, ctx, id, self.update_wait()).await?;
        }
        Ok(())
    }

    async fn delete(&self, ctx: &OperationContext, id: &str) -> Result<()> {
        ctx.call(ctx.session.dns().delete_dns_record(id)).await
    }
}

pub fn register(builder: &mut RegistryBuilder) -> Result<()> {
    builder.lifecycle(RESOURCE_TYPE, DnsRecordResource)?;
    Ok(())
}
