//! `scp_object_storage_bucket`

use async_trait::async_trait;
use scp_cloud::api::{Bucket, CreateBucketRequest};
use scp_cloud::{
    ApiResult, AttributeSchema, Lifecycle, OperationContext, OptionalBool, RegistryBuilder,
    Result, Schema, Validator, wait_for,
};
use serde::{Deserialize, Serialize};

pub const RESOURCE_TYPE: &str = "scp_object_storage_bucket";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketModel {
    pub name: String,
    pub object_storage_id: String,
    /// Unset leaves the service default in place
    #[serde(default)]
    pub versioning_enabled: Option<bool>,
    #[serde(default)]
    pub state: Option<String>,
}

impl From<Bucket> for BucketModel {
    fn from(bucket: Bucket) -> Self {
        Self {
            name: bucket.name,
            object_storage_id: bucket.object_storage_id,
            versioning_enabled: Some(bucket.versioning_enabled),
            state: Some(bucket.state),
        }
    }
}

pub struct BucketResource;

#[async_trait]
impl Lifecycle for BucketResource {
    type Model = BucketModel;

    fn schema(&self) -> Schema {
        Schema::new("Object storage bucket")
            .attribute(
                AttributeSchema::string("name")
                    .required()
                    .force_new()
                    .validate_with(Validator::bucket_name()),
            )
            .attribute(AttributeSchema::string("object_storage_id").required().force_new())
            .attribute(AttributeSchema::bool("versioning_enabled"))
            .attribute(AttributeSchema::string("state").computed())
    }

    async fn create(&self, ctx: &OperationContext, model: &BucketModel) -> Result<String> {
        let request = CreateBucketRequest {
            object_storage_bucket_name: model.name.clone(),
            object_storage_id: model.object_storage_id.clone(),
            versioning_enabled: OptionalBool::from(model.versioning_enabled),
        };
        let response = ctx.call(ctx.session.storage().create_bucket(&request)).await?;
        Ok(response.resource_id)
    }

    async fn read(&self, ctx: &OperationContext, id: &str) -> Result<BucketModel> {
        let bucket = ctx.call(ctx.session.storage().get_bucket(id)).await?;
        Ok(bucket.into())
    }

    async fn status(&self, ctx: &OperationContext, id: &str) -> ApiResult<String> {
        Ok(ctx.session.storage().get_bucket(id).await?.state)
    }

    async fn update(
        &self,
        ctx: &OperationContext,
        id: &str,
        prior: &BucketModel,
        planned: &BucketModel,
    ) -> Result<()> {
        if let Some(enabled) = planned.versioning_enabled
            && prior.versioning_enabled != Some(enabled)
        {
            ctx.call(ctx.session.storage().set_bucket_versioning(id, enabled))
                .await?;
            wait_for(self, ctx, id, self.update_wait()).await?;
        }
        Ok(())
    }

    async fn delete(&self, ctx: &OperationContext, id: &str) -> Result<()> {
        ctx.call(ctx.session.storage().delete_bucket(id)).await
    }

    /// Buckets of another project answer 403
    fn vanishes_on_forbidden(&self) -> bool {
        true
    }
}

pub fn register(builder: &mut RegistryBuilder) -> Result<()> {
    builder.lifecycle(RESOURCE_TYPE, BucketResource)?;
    Ok(())
}
