//! `scp_virtual_server`

use async_trait::async_trait;
use scp_cloud::api::{CreateVirtualServerRequest, VirtualServer};
use scp_cloud::{
    ApiResult, AttributeSchema, Lifecycle, OperationContext, OptionalBool, RegistryBuilder,
    Result, Schema, WaitSpec, wait_for,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

pub const RESOURCE_TYPE: &str = "scp_virtual_server";

/// The status record lags behind the create/delete acknowledgement
const STATUS_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VirtualServerModel {
    pub name: String,
    pub server_type: String,
    pub image_id: String,
    #[serde(default)]
    pub security_group_ids: Vec<String>,
    #[serde(default)]
    pub delete_protection: Option<bool>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
}

impl From<VirtualServer> for VirtualServerModel {
    fn from(server: VirtualServer) -> Self {
        Self {
            name: server.name,
            server_type: server.server_type,
            image_id: server.image_id,
            security_group_ids: server.security_group_ids,
            delete_protection: Some(server.delete_protection_enabled),
            state: Some(server.state),
            ip: server.ip,
        }
    }
}

pub struct VirtualServerResource;

#[async_trait]
impl Lifecycle for VirtualServerResource {
    type Model = VirtualServerModel;

    fn schema(&self) -> Schema {
        Schema::new("Virtual server")
            .attribute(AttributeSchema::string("name").required().force_new())
            .attribute(
                AttributeSchema::string("server_type")
                    .required()
                    .describe("Server type, e.g. s1v2m4"),
            )
            .attribute(AttributeSchema::string("image_id").required().force_new())
            .attribute(AttributeSchema::string_list("security_group_ids"))
            .attribute(
                AttributeSchema::bool("delete_protection")
                    .force_new()
                    .default_value(false),
            )
            .attribute(AttributeSchema::string("state").computed())
            .attribute(AttributeSchema::string("ip").computed())
    }

    async fn create(&self, ctx: &OperationContext, model: &VirtualServerModel) -> Result<String> {
        let request = CreateVirtualServerRequest {
            virtual_server_name: model.name.clone(),
            server_type: model.server_type.clone(),
            image_id: model.image_id.clone(),
            security_group_ids: model.security_group_ids.clone(),
            delete_protection: OptionalBool::from(model.delete_protection),
        };
        let response = ctx
            .call(ctx.session.compute().create_virtual_server(&request))
            .await?;
        Ok(response.resource_id)
    }

    async fn read(&self, ctx: &OperationContext, id: &str) -> Result<VirtualServerModel> {
        let server = ctx.call(ctx.session.compute().get_virtual_server(id)).await?;
        Ok(server.into())
    }

    async fn status(&self, ctx: &OperationContext, id: &str) -> ApiResult<String> {
        let server = ctx.session.compute().get_virtual_server(id).await?;
        Ok(server.state)
    }

    async fn update(
        &self,
        ctx: &OperationContext,
        id: &str,
        prior: &VirtualServerModel,
        planned: &VirtualServerModel,
    ) -> Result<()> {
        let compute = ctx.session.compute();

        if prior.server_type != planned.server_type {
            tracing::info!(id, server_type = %planned.server_type, "Resizing virtual server");
            ctx.call(compute.resize_virtual_server(id, &planned.server_type))
                .await?;
            wait_for(self, ctx, id, self.update_wait()).await?;
        }

        let before: BTreeSet<&str> = prior.security_group_ids.iter().map(String::as_str).collect();
        let after: BTreeSet<&str> = planned.security_group_ids.iter().map(String::as_str).collect();

        for sg in after.difference(&before) {
            ctx.call(compute.attach_security_group(id, sg)).await?;
            wait_for(self, ctx, id, self.update_wait()).await?;
        }
        for sg in before.difference(&after) {
            ctx.call(compute.detach_security_group(id, sg)).await?;
            wait_for(self, ctx, id, self.update_wait()).await?;
        }

        Ok(())
    }

    async fn delete(&self, ctx: &OperationContext, id: &str) -> Result<()> {
        ctx.call(ctx.session.compute().delete_virtual_server(id))
            .await
    }

    fn create_wait(&self) -> WaitSpec {
        WaitSpec::ready().with_grace(STATUS_GRACE)
    }

    fn delete_wait(&self) -> WaitSpec {
        WaitSpec::deleted().with_grace(STATUS_GRACE)
    }
}

pub fn register(builder: &mut RegistryBuilder) -> Result<()> {
    builder.lifecycle(RESOURCE_TYPE, VirtualServerResource)?;
    Ok(())
}
