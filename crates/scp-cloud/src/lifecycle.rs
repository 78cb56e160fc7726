//! Reconciliation loop
//!
//! A resource type implements [`Lifecycle`] against its typed model;
//! [`ResourceAdapter`] turns it into a registry handler that runs the shared
//! skeleton:
//!
//! - create: validate, create, wait for ready, follow-up (rolled back on
//!   failure), read
//! - read: fetch by id; a vanished resource yields an empty identity
//! - update: apply changes (each followed by a wait), read
//! - delete: delete (already gone is fine), wait for `DELETED`

use crate::api::ApiResult;
use crate::cancel::CancelToken;
use crate::config::{DEFAULT_OPERATION_TIMEOUT, DEFAULT_POLL_INTERVAL};
use crate::data::ResourceData;
use crate::error::{CloudError, Result};
use crate::registry::{DataSourceHandler, ResourceHandler};
use crate::schema::Schema;
use crate::session::Session;
use crate::waiter::{self, ACTIVE, CREATING, DELETED, EDITING, TERMINATING, UPDATING, WaitPolicy};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Everything a handler needs for one operation
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub session: Session,
    pub cancel: CancelToken,
    pub deadline: Instant,
    pub poll_interval: Duration,
}

impl OperationContext {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            cancel: CancelToken::never(),
            deadline: Instant::now() + DEFAULT_OPERATION_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Overall deadline measured from now
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now() + timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Invoke a remote call, giving up early on cancellation
    pub async fn call<T, F>(&self, request: F) -> Result<T>
    where
        F: Future<Output = ApiResult<T>>,
    {
        Ok(self.cancel.guard(request).await??)
    }

    pub fn policy(&self, spec: &WaitSpec) -> WaitPolicy {
        WaitPolicy::new(spec.pending, spec.target)
            .with_interval(self.poll_interval)
            .with_deadline(self.deadline)
            .with_grace(spec.grace)
            .fail_on_not_found(spec.fail_on_not_found)
    }

    pub async fn wait<F, Fut>(&self, id: &str, spec: &WaitSpec, reader: F) -> Result<String>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = ApiResult<String>>,
    {
        waiter::wait_for_status(id, &self.policy(spec), &self.cancel, reader).await
    }
}

/// Pending and target states of one kind of operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSpec {
    pub pending: &'static [&'static str],
    pub target: &'static [&'static str],
    pub grace: Duration,
    pub fail_on_not_found: bool,
}

impl WaitSpec {
    pub const fn new(pending: &'static [&'static str], target: &'static [&'static str]) -> Self {
        Self {
            pending,
            target,
            grace: Duration::ZERO,
            fail_on_not_found: true,
        }
    }

    pub const fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub const fn ready() -> Self {
        Self::new(&[CREATING], &[ACTIVE])
    }

    pub const fn updated() -> Self {
        Self::new(&[EDITING, UPDATING], &[ACTIVE])
    }

    pub const fn deleted() -> Self {
        Self {
            pending: &[TERMINATING],
            target: &[DELETED],
            grace: Duration::ZERO,
            fail_on_not_found: false,
        }
    }
}

/// Typed lifecycle of one resource type
#[async_trait]
pub trait Lifecycle: Send + Sync + 'static {
    /// Declarative attributes, as exchanged with the host
    type Model: Serialize + DeserializeOwned + Send + Sync;

    fn schema(&self) -> Schema;

    /// Issue the create call and return the new identifier
    async fn create(&self, ctx: &OperationContext, model: &Self::Model) -> Result<String>;

    /// Mutations that need the resource to exist first
    async fn after_create(
        &self,
        _ctx: &OperationContext,
        _id: &str,
        _model: &Self::Model,
    ) -> Result<()> {
        Ok(())
    }

    /// Fetch the remote state; a missing resource is `CloudError::NotFound`
    async fn read(&self, ctx: &OperationContext, id: &str) -> Result<Self::Model>;

    /// Current lifecycle state, used as the wait-for-status reader
    async fn status(&self, ctx: &OperationContext, id: &str) -> ApiResult<String>;

    /// Apply changed attribute groups, waiting after each call
    async fn update(
        &self,
        ctx: &OperationContext,
        id: &str,
        prior: &Self::Model,
        planned: &Self::Model,
    ) -> Result<()>;

    /// Issue the delete call
    async fn delete(&self, ctx: &OperationContext, id: &str) -> Result<()>;

    fn create_wait(&self) -> WaitSpec {
        WaitSpec::ready()
    }

    fn update_wait(&self) -> WaitSpec {
        WaitSpec::updated()
    }

    fn delete_wait(&self) -> WaitSpec {
        WaitSpec::deleted()
    }

    /// Whether HTTP 403 on read also means the resource vanished
    fn vanishes_on_forbidden(&self) -> bool {
        false
    }

    /// Validate an identifier given to `import`
    fn check_import_id(&self, _id: &str) -> Result<()> {
        Ok(())
    }
}

/// Wait on a lifecycle's status reader
pub async fn wait_for<L: Lifecycle + ?Sized>(
    lifecycle: &L,
    ctx: &OperationContext,
    id: &str,
    spec: WaitSpec,
) -> Result<String> {
    ctx.wait(id, &spec, move |id| async move { lifecycle.status(ctx, &id).await })
        .await
}

/// Registry handler running the reconciliation skeleton for a [`Lifecycle`]
pub struct ResourceAdapter<L> {
    lifecycle: L,
}

impl<L: Lifecycle> ResourceAdapter<L> {
    pub fn new(lifecycle: L) -> Self {
        Self { lifecycle }
    }

    pub fn lifecycle(&self) -> &L {
        &self.lifecycle
    }

    fn is_vanished(&self, err: &CloudError) -> bool {
        match err {
            CloudError::NotFound(_) => true,
            CloudError::Transport {
                status: Some(403), ..
            } => self.lifecycle.vanishes_on_forbidden(),
            _ => false,
        }
    }

    async fn read_state(&self, ctx: &OperationContext, id: &str) -> Result<ResourceData> {
        match self.lifecycle.read(ctx, id).await {
            Ok(model) => ResourceData::from_model(id, &model),
            Err(e) if self.is_vanished(&e) => {
                tracing::info!(id, "Resource vanished outside the host");
                Ok(ResourceData::vanished())
            }
            Err(e) => Err(e),
        }
    }

    async fn read_existing(&self, ctx: &OperationContext, id: &str) -> Result<ResourceData> {
        let data = self.read_state(ctx, id).await?;
        if data.is_gone() {
            return Err(CloudError::NotFound(id.to_string()));
        }
        Ok(data)
    }

    async fn delete_path(&self, ctx: &OperationContext, id: &str) -> Result<()> {
        match self.lifecycle.delete(ctx, id).await {
            Ok(()) => {}
            Err(e) if self.is_vanished(&e) => {
                tracing::debug!(id, "Resource already gone");
            }
            Err(e) => return Err(e),
        }

        wait_for(&self.lifecycle, ctx, id, self.lifecycle.delete_wait()).await?;
        tracing::info!(id, "Resource deleted");
        Ok(())
    }

    fn planned_model(&self, planned: &mut ResourceData) -> Result<L::Model> {
        let schema = self.lifecycle.schema();
        schema.apply_defaults(&mut planned.attributes);
        schema.validate(&planned.attributes)?;
        planned.to_model()
    }
}

#[async_trait]
impl<L: Lifecycle> ResourceHandler for ResourceAdapter<L> {
    fn schema(&self) -> Schema {
        self.lifecycle.schema()
    }

    #[tracing::instrument(skip_all)]
    async fn create(&self, ctx: &OperationContext, mut planned: ResourceData) -> Result<ResourceData> {
        let model = self.planned_model(&mut planned)?;

        let id = self.lifecycle.create(ctx, &model).await?;
        tracing::info!(id = %id, "Resource created, waiting until ready");

        wait_for(&self.lifecycle, ctx, &id, self.lifecycle.create_wait()).await?;

        if let Err(e) = self.lifecycle.after_create(ctx, &id, &model).await {
            tracing::warn!(id = %id, error = %e, "Follow-up after create failed, rolling back");
            if let Err(rollback) = self.delete_path(ctx, &id).await {
                tracing::warn!(id = %id, error = %rollback, "Rollback failed");
            }
            return Err(e);
        }

        self.read_existing(ctx, &id).await
    }

    #[tracing::instrument(skip(self, ctx))]
    async fn read(&self, ctx: &OperationContext, id: &str) -> Result<ResourceData> {
        self.read_state(ctx, id).await
    }

    #[tracing::instrument(skip_all, fields(id = %prior.id))]
    async fn update(
        &self,
        ctx: &OperationContext,
        prior: &ResourceData,
        mut planned: ResourceData,
    ) -> Result<ResourceData> {
        let model = self.planned_model(&mut planned)?;

        let schema = self.lifecycle.schema();
        if let Some(attribute) = schema
            .requires_replacement(&prior.attributes, &planned.attributes)
            .into_iter()
            .next()
        {
            return Err(CloudError::invalid_input(
                attribute,
                "cannot be changed in place; the resource must be replaced",
            ));
        }

        let prior_model: L::Model = prior.to_model()?;
        self.lifecycle
            .update(ctx, &prior.id, &prior_model, &model)
            .await?;
        tracing::info!(id = %prior.id, "Resource updated");

        self.read_existing(ctx, &prior.id).await
    }

    #[tracing::instrument(skip(self, ctx))]
    async fn delete(&self, ctx: &OperationContext, id: &str) -> Result<()> {
        self.delete_path(ctx, id).await
    }

    #[tracing::instrument(skip(self, ctx))]
    async fn import(&self, ctx: &OperationContext, id: &str) -> Result<ResourceData> {
        self.lifecycle.check_import_id(id)?;
        self.read_existing(ctx, id).await
    }
}

/// Typed read-only data source
#[async_trait]
pub trait DataSource: Send + Sync + 'static {
    type Args: DeserializeOwned + Send;
    type Output: Serialize + Send;

    fn schema(&self) -> Schema;

    async fn read(&self, ctx: &OperationContext, args: Self::Args) -> Result<Self::Output>;
}

pub struct DataSourceAdapter<D> {
    source: D,
}

impl<D: DataSource> DataSourceAdapter<D> {
    pub fn new(source: D) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<D: DataSource> DataSourceHandler for DataSourceAdapter<D> {
    fn schema(&self) -> Schema {
        self.source.schema()
    }

    async fn read(&self, ctx: &OperationContext, mut args: ResourceData) -> Result<ResourceData> {
        let schema = self.source.schema();
        schema.apply_defaults(&mut args.attributes);
        schema.validate(&args.attributes)?;

        let output = self.source.read(ctx, args.to_model()?).await?;
        ResourceData::from_model(ctx.session.project_id(), &output)
    }
}
