//! `scp_security_group` and `scp_security_group_rule`
//!
//! Rules live under their security group and are addressed by the composite
//! id `<security_group_id>:<rule_id>`. Every rule attribute forces a
//! replacement, so rules are never updated in place.

use async_trait::async_trait;
use scp_cloud::api::{CreateSecurityGroupRequest, CreateSecurityGroupRuleRequest};
use scp_cloud::{
    ApiResult, AttributeSchema, Lifecycle, OperationContext, RegistryBuilder, Result, Schema,
    Validator, merge_id, split_id, wait_for,
};
use serde::{Deserialize, Serialize};

pub const SECURITY_GROUP: &str = "scp_security_group";
pub const SECURITY_GROUP_RULE: &str = "scp_security_group_rule";

const CIDR_PATTERN: &str = r"^((25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.){3}(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])/([0-9]|[12][0-9]|3[0-2])$";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityGroupModel {
    pub name: String,
    pub vpc_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

pub struct SecurityGroupResource;

#[async_trait]
impl Lifecycle for SecurityGroupResource {
    type Model = SecurityGroupModel;

    fn schema(&self) -> Schema {
        Schema::new("Security group")
            .attribute(AttributeSchema::string("name").required().force_new())
            .attribute(AttributeSchema::string("vpc_id").required().force_new())
            .attribute(AttributeSchema::string("description"))
            .attribute(AttributeSchema::string("state").computed())
    }

    async fn create(&self, ctx: &OperationContext, model: &SecurityGroupModel) -> Result<String> {
        let request = CreateSecurityGroupRequest {
            security_group_name: model.name.clone(),
            vpc_id: model.vpc_id.clone(),
            description: model.description.clone().unwrap_or_default(),
        };
        let response = ctx
            .call(ctx.session.network().create_security_group(&request))
            .await?;
        Ok(response.resource_id)
    }

    async fn read(&self, ctx: &OperationContext, id: &str) -> Result<SecurityGroupModel> {
        let group = ctx.call(ctx.session.network().get_security_group(id)).await?;
        Ok(SecurityGroupModel {
            name: group.name,
            vpc_id: group.vpc_id,
            description: Some(group.description).filter(|d| !d.is_empty()),
            state: Some(group.state),
        })
    }

    async fn status(&self, ctx: &OperationContext, id: &str) -> ApiResult<String> {
        Ok(ctx.session.network().get_security_group(id).await?.state)
    }

    async fn update(
        &self,
        ctx: &OperationContext,
        id: &str,
        prior: &SecurityGroupModel,
        planned: &SecurityGroupModel,
    ) -> Result<()> {
        if prior.description != planned.description {
            let description = planned.description.as_deref().unwrap_or_default();
            ctx.call(
                ctx.session
                    .network()
                    .update_security_group_description(id, description),
            )
            .await?;
            wait_for(self, ctx, id, self.update_wait()).await?;
        }
        Ok(())
    }

    async fn delete(&self, ctx: &OperationContext, id: &str) -> Result<()> {
        ctx.call(ctx.session.network().delete_security_group(id))
            .await
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityGroupRuleModel {
    pub security_group_id: String,
    pub direction: String,
    pub protocol: String,
    #[serde(default)]
    pub port: Option<u16>,
    pub remote_ip_prefix: String,
    #[serde(default)]
    pub state: Option<String>,
}

pub struct SecurityGroupRuleResource;

#[async_trait]
impl Lifecycle for SecurityGroupRuleResource {
    type Model = SecurityGroupRuleModel;

    fn schema(&self) -> Schema {
        Schema::new("Security group rule")
            .attribute(AttributeSchema::string("security_group_id").required().force_new())
            .attribute(
                AttributeSchema::string("direction")
                    .required()
                    .force_new()
                    .validate_with(Validator::one_of(["ingress", "egress"])),
            )
            .attribute(
                AttributeSchema::string("protocol")
                    .required()
                    .force_new()
                    .validate_with(Validator::one_of(["tcp", "udp", "icmp", "all"])),
            )
            .attribute(
                AttributeSchema::int("port")
                    .force_new()
                    .validate_with(Validator::int_range(1, 65535)),
            )
            .attribute(
                AttributeSchema::string("remote_ip_prefix")
                    .required()
                    .force_new()
                    .validate_with(Validator::pattern("an IPv4 CIDR block", CIDR_PATTERN)),
            )
            .attribute(AttributeSchema::string("state").computed())
    }

    async fn create(
        &self,
        ctx: &OperationContext,
        model: &SecurityGroupRuleModel,
    ) -> Result<String> {
        let request = CreateSecurityGroupRuleRequest {
            direction: model.direction.clone(),
            protocol: model.protocol.clone(),
            port: model.port,
            remote_ip_prefix: model.remote_ip_prefix.clone(),
        };
        let response = ctx
            .call(
                ctx.session
                    .network()
                    .create_security_group_rule(&model.security_group_id, &request),
            )
            .await?;
        merge_id(&model.security_group_id, &response.resource_id)
    }

    async fn read(&self, ctx: &OperationContext, id: &str) -> Result<SecurityGroupRuleModel> {
        let (security_group_id, rule_id) = split_id(id)?;
        let rule = ctx
            .call(
                ctx.session
                    .network()
                    .get_security_group_rule(security_group_id, rule_id),
            )
            .await?;
        Ok(SecurityGroupRuleModel {
            security_group_id: security_group_id.to_string(),
            direction: rule.direction,
            protocol: rule.protocol,
            port: rule.port,
            remote_ip_prefix: rule.remote_ip_prefix,
            state: Some(rule.state),
        })
    }

    async fn status(&self, ctx: &OperationContext, id: &str) -> ApiResult<String> {
        let Ok((security_group_id, rule_id)) = split_id(id) else {
            return Err(scp_cloud::ApiError::not_found(id));
        };
        let rule = ctx
            .session
            .network()
            .get_security_group_rule(security_group_id, rule_id)
            .await?;
        Ok(rule.state)
    }

    async fn update(
        &self,
        _ctx: &OperationContext,
        _id: &str,
        _prior: &SecurityGroupRuleModel,
        _planned: &SecurityGroupRuleModel,
    ) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, ctx: &OperationContext, id: &str) -> Result<()> {
        let (security_group_id, rule_id) = split_id(id)?;
        ctx.call(
            ctx.session
                .network()
                .delete_security_group_rule(security_group_id, rule_id),
        )
        .await
    }

    fn check_import_id(&self, id: &str) -> Result<()> {
        split_id(id).map(|_| ())
    }
}

pub fn register(builder: &mut RegistryBuilder) -> Result<()> {
    builder
        .lifecycle(SECURITY_GROUP, SecurityGroupResource)?
        .lifecycle(SECURITY_GROUP_RULE, SecurityGroupRuleResource)?;
    Ok(())
}
