//! `scp_virtual_servers`

use async_trait::async_trait;
use scp_cloud::api::VirtualServer;
use scp_cloud::{AttributeSchema, DataSource, OperationContext, RegistryBuilder, Result, Schema};
use serde::{Deserialize, Serialize};

pub const DATA_SOURCE_TYPE: &str = "scp_virtual_servers";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VirtualServersArgs {
    /// Keep servers whose name contains this text
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VirtualServerSummary {
    pub id: String,
    pub name: String,
    pub state: String,
    pub server_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

impl From<VirtualServer> for VirtualServerSummary {
    fn from(server: VirtualServer) -> Self {
        Self {
            id: server.id,
            name: server.name,
            state: server.state,
            server_type: server.server_type,
            ip: server.ip,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VirtualServersOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub virtual_servers: Vec<VirtualServerSummary>,
}

pub struct VirtualServers;

#[async_trait]
impl DataSource for VirtualServers {
    type Args = VirtualServersArgs;
    type Output = VirtualServersOutput;

    fn schema(&self) -> Schema {
        Schema::new("Virtual servers of the configured project")
            .attribute(AttributeSchema::string("name").describe("Substring filter on the server name"))
            .attribute(AttributeSchema::object_list("virtual_servers").computed())
    }

    async fn read(&self, ctx: &OperationContext, args: VirtualServersArgs) -> Result<VirtualServersOutput> {
        let servers = ctx.call(ctx.session.compute().list_virtual_servers()).await?;

        let virtual_servers: Vec<VirtualServerSummary> = servers
            .into_iter()
            .filter(|server| {
                args.name
                    .as_deref()
                    .is_none_or(|filter| server.name.contains(filter))
            })
            .map(VirtualServerSummary::from)
            .collect();
        tracing::debug!(count = virtual_servers.len(), "Listed virtual servers");

        Ok(VirtualServersOutput {
            name: args.name,
            virtual_servers,
        })
    }
}

pub fn register(builder: &mut RegistryBuilder) -> Result<()> {
    builder.typed_data_source(DATA_SOURCE_TYPE, VirtualServers)?;
    Ok(())
}
