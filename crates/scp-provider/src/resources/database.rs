//! `scp_database`
//!
//! Disaster recovery can only be enabled once the database is running, so it
//! is a follow-up of create. If enabling fails the new database is deleted
//! again and the enable error is reported.

use async_trait::async_trait;
use scp_cloud::api::{CreateDatabaseRequest, Database};
use scp_cloud::waiter::{ACTIVE, DELETED, TERMINATING};
use scp_cloud::{
    ApiResult, AttributeSchema, CloudError, Lifecycle, OperationContext, RegistryBuilder, Result,
    Schema, Validator, WaitSpec, wait_for,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const RESOURCE_TYPE: &str = "scp_database";

const STATUS_GRACE: Duration = Duration::from_secs(10);

/// The service keeps reporting `ACTIVE` for a moment after accepting a delete
const DELETE_PENDING: &[&str] = &[ACTIVE, TERMINATING];
const DELETE_TARGET: &[&str] = &[DELETED];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseModel {
    pub name: String,
    pub engine: String,
    pub engine_version: String,
    #[serde(default = "default_contract")]
    pub contract_period: String,
    pub subnet_id: String,
    #[serde(default)]
    pub dr_enabled: Option<bool>,
    #[serde(default)]
    pub state: Option<String>,
}

fn default_contract() -> String {
    "none".to_string()
}

impl From<Database> for DatabaseModel {
    fn from(database: Database) -> Self {
        Self {
            name: database.name,
            engine: database.engine,
            engine_version: database.engine_version,
            contract_period: database.contract_period,
            subnet_id: database.subnet_id,
            dr_enabled: Some(database.dr_enabled),
            state: Some(database.state),
        }
    }
}

pub struct DatabaseResource;

impl DatabaseResource {
    async fn enable_dr(&self, ctx: &OperationContext, id: &str) -> Result<()> {
        tracing::info!(id, "Enabling disaster recovery");
        ctx.call(ctx.session.database().enable_disaster_recovery(id))
            .await?;
        wait_for(self, ctx, id, self.update_wait()).await?;
        Ok(())
    }
}

#[async_trait]
impl Lifecycle for DatabaseResource {
    type Model = DatabaseModel;

    fn schema(&self) -> Schema {
        Schema::new("Managed database")
            .attribute(AttributeSchema::string("name").required().force_new())
            .attribute(
                AttributeSchema::string("engine")
                    .required()
                    .force_new()
                    .validate_with(Validator::one_of([
                        "mysql",
                        "mariadb",
                        "postgresql",
                        "sqlserver",
                    ])),
            )
            .attribute(AttributeSchema::string("engine_version").required().force_new())
            .attribute(
                AttributeSchema::string("contract_period")
                    .default_value("none")
                    .validate_with(Validator::one_of(["none", "1-year", "3-year"])),
            )
            .attribute(AttributeSchema::string("subnet_id").required().force_new())
            .attribute(
                AttributeSchema::bool("dr_enabled")
                    .describe("Enable disaster recovery replication after creation"),
            )
            .attribute(AttributeSchema::string("state").computed())
    }

    async fn create(&self, ctx: &OperationContext, model: &DatabaseModel) -> Result<String> {
        let request = CreateDatabaseRequest {
            database_name: model.name.clone(),
            engine: model.engine.clone(),
            engine_version: model.engine_version.clone(),
            contract_period: model.contract_period.clone(),
            subnet_id: model.subnet_id.clone(),
        };
        let response = ctx
            .call(ctx.session.database().create_database(&request))
            .await?;
        Ok(response.resource_id)
    }

    async fn after_create(
        &self,
        ctx: &OperationContext,
        id: &str,
        model: &DatabaseModel,
    ) -> Result<()> {
        if model.dr_enabled == Some(true) {
            self.enable_dr(ctx, id).await?;
        }
        Ok(())
    }

    async fn read(&self, ctx: &OperationContext, id: &str) -> Result<DatabaseModel> {
        let database = ctx.call(ctx.session.database().get_database(id)).await?;
        Ok(database.into())
    }

    async fn status(&self, ctx: &OperationContext, id: &str) -> ApiResult<String> {
        Ok(ctx.session.database().get_database(id).await?.state)
    }

    async fn update(
        &self,
        ctx: &OperationContext,
        id: &str,
        prior: &DatabaseModel,
        planned: &DatabaseModel,
    ) -> Result<()> {
        if prior.contract_period != planned.contract_period {
            ctx.call(
                ctx.session
                    .database()
                    .modify_contract(id, &planned.contract_period),
            )
            .await?;
            wait_for(self, ctx, id, self.update_wait()).await?;
        }

        match (prior.dr_enabled.unwrap_or(false), planned.dr_enabled) {
            (false, Some(true)) => self.enable_dr(ctx, id).await?,
            (true, Some(false)) => {
                return Err(CloudError::invalid_input(
                    "dr_enabled",
                    "disaster recovery cannot be disabled in place",
                ));
            }
            _ => {}
        }

        Ok(())
    }

    async fn delete(&self, ctx: &OperationContext, id: &str) -> Result<()> {
        ctx.call(ctx.session.database().delete_database(id)).await
    }

    fn create_wait(&self) -> WaitSpec {
        WaitSpec::ready().with_grace(STATUS_GRACE)
    }

    fn delete_wait(&self) -> WaitSpec {
        WaitSpec {
            pending: DELETE_PENDING,
            target: DELETE_TARGET,
            grace: STATUS_GRACE,
            fail_on_not_found: false,
        }
    }
}

pub fn register(builder: &mut RegistryBuilder) -> Result<()> {
    builder.lifecycle(RESOURCE_TYPE, DatabaseResource)?;
    Ok(())
}
