//! In-memory cloud used by the integration tests
//!
//! Every API call is logged as `operation` or `operation:id`. Lifecycle
//! states can be scripted per id; a script step is consumed by each `get_*`
//! call for that id, after which the last state sticks.

#![allow(dead_code)]

use async_trait::async_trait;
use scp_cloud::api::{
    Bucket, ComputeApi, CreateBucketRequest, CreateDatabaseRequest, CreateDnsRecordRequest,
    CreateSecurityGroupRequest, CreateSecurityGroupRuleRequest, CreateVirtualServerRequest,
    Database, DatabaseApi, DnsApi, DnsRecord, NetworkApi, ObjectStorageApi, SecurityGroup,
    SecurityGroupRule, UpdateDnsRecordRequest, VirtualServer,
};
use scp_cloud::{
    ApiError, ApiResult, AsyncResponse, AuthMethod, OperationContext, ResolvedConfig, Session,
    SessionBuilder,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    State(&'static str),
    /// The next read answers HTTP 404
    Gone,
}

pub trait Stateful: Clone {
    fn set_state(&mut self, state: &str);
}

impl Stateful for VirtualServer {
    fn set_state(&mut self, state: &str) {
        self.state = state.to_string();
    }
}

impl Stateful for Bucket {
    fn set_state(&mut self, state: &str) {
        self.state = state.to_string();
    }
}

impl Stateful for SecurityGroup {
    fn set_state(&mut self, state: &str) {
        self.state = state.to_string();
    }
}

impl Stateful for SecurityGroupRule {
    fn set_state(&mut self, state: &str) {
        self.state = state.to_string();
    }
}

impl Stateful for Database {
    fn set_state(&mut self, state: &str) {
        self.state = state.to_string();
    }
}

impl Stateful for DnsRecord {
    fn set_state(&mut self, state: &str) {
        self.state = state.to_string();
    }
}

/// Live objects plus the ones deleted so far
struct Table<T> {
    live: HashMap<String, T>,
    deleted: HashMap<String, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            live: HashMap::new(),
            deleted: HashMap::new(),
        }
    }
}

impl<T: Stateful> Table<T> {
    fn insert(&mut self, key: &str, item: T) {
        self.live.insert(key.to_string(), item);
    }

    fn fetch(&mut self, key: &str, script: Option<&mut VecDeque<Step>>) -> ApiResult<T> {
        match script.and_then(VecDeque::pop_front) {
            Some(Step::Gone) => Err(ApiError::not_found(format!("{} not found", key))),
            Some(Step::State(state)) => {
                let item = match self.live.get_mut(key) {
                    Some(item) => item,
                    None => self
                        .deleted
                        .get_mut(key)
                        .ok_or_else(|| ApiError::not_found(format!("{} not found", key)))?,
                };
                item.set_state(state);
                Ok(item.clone())
            }
            None => self
                .live
                .get(key)
                .cloned()
                .ok_or_else(|| ApiError::not_found(format!("{} not found", key))),
        }
    }

    fn modify(&mut self, key: &str, change: impl FnOnce(&mut T)) -> ApiResult<()> {
        let item = self
            .live
            .get_mut(key)
            .ok_or_else(|| ApiError::not_found(format!("{} not found", key)))?;
        change(item);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> ApiResult<()> {
        let item = self
            .live
            .remove(key)
            .ok_or_else(|| ApiError::not_found(format!("{} not found", key)))?;
        self.deleted.insert(key.to_string(), item);
        Ok(())
    }
}

#[derive(Default)]
pub struct State {
    servers: Table<VirtualServer>,
    buckets: Table<Bucket>,
    groups: Table<SecurityGroup>,
    rules: Table<SecurityGroupRule>,
    databases: Table<Database>,
    records: Table<DnsRecord>,
    scripts: HashMap<String, VecDeque<Step>>,
    failures: HashMap<String, ApiError>,
    next_ids: VecDeque<String>,
    counter: usize,
    calls: Vec<String>,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        if let Some(id) = self.next_ids.pop_front() {
            return id;
        }
        self.counter += 1;
        format!("{}-{}", prefix, self.counter)
    }
}

fn rule_key(security_group_id: &str, rule_id: &str) -> String {
    format!("{}/{}", security_group_id, rule_id)
}

#[derive(Default)]
pub struct FakeCloud {
    state: Mutex<State>,
}

impl FakeCloud {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Identifiers handed out by the next create calls, in order
    pub fn queue_ids(&self, ids: &[&str]) {
        let mut state = self.state.lock().unwrap();
        state.next_ids.extend(ids.iter().map(|id| id.to_string()));
    }

    pub fn script(&self, id: &str, steps: &[Step]) {
        let mut state = self.state.lock().unwrap();
        state
            .scripts
            .entry(id.to_string())
            .or_default()
            .extend(steps.iter().copied());
    }

    /// Make the next call of `operation` fail with `error`
    pub fn fail_next(&self, operation: &str, error: ApiError) {
        let mut state = self.state.lock().unwrap();
        state.failures.insert(operation.to_string(), error);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.split(':').next() == Some(operation))
            .count()
    }

    pub fn add_server(&self, server: VirtualServer) {
        let mut state = self.state.lock().unwrap();
        let id = server.id.clone();
        state.servers.insert(&id, server);
    }

    pub fn add_bucket(&self, bucket: Bucket) {
        let mut state = self.state.lock().unwrap();
        let id = bucket.id.clone();
        state.buckets.insert(&id, bucket);
    }

    pub fn add_rule(&self, security_group_id: &str, rule: SecurityGroupRule) {
        let mut state = self.state.lock().unwrap();
        let key = rule_key(security_group_id, &rule.id);
        state.rules.insert(&key, rule);
    }

    pub fn server(&self, id: &str) -> Option<VirtualServer> {
        self.state.lock().unwrap().servers.live.get(id).cloned()
    }

    pub fn database(&self, id: &str) -> Option<Database> {
        self.state.lock().unwrap().databases.live.get(id).cloned()
    }

    pub fn record(&self, id: &str) -> Option<DnsRecord> {
        self.state.lock().unwrap().records.live.get(id).cloned()
    }

    fn enter(&self, operation: &str, id: &str) -> ApiResult<MutexGuard<'_, State>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(if id.is_empty() {
            operation.to_string()
        } else {
            format!("{}:{}", operation, id)
        });
        if let Some(error) = state.failures.remove(operation) {
            return Err(error);
        }
        Ok(state)
    }
}

fn accepted(id: &str) -> AsyncResponse {
    AsyncResponse::new(id)
}

#[async_trait]
impl ComputeApi for FakeCloud {
    async fn create_virtual_server(
        &self,
        request: &CreateVirtualServerRequest,
    ) -> ApiResult<AsyncResponse> {
        let mut guard = self.enter("create_virtual_server", "")?;
        let state = &mut *guard;
        let id = state.next_id("vs");
        state.servers.insert(
            &id,
            VirtualServer {
                id: id.clone(),
                name: request.virtual_server_name.clone(),
                state: "ACTIVE".to_string(),
                server_type: request.server_type.clone(),
                image_id: request.image_id.clone(),
                security_group_ids: request.security_group_ids.clone(),
                ip: Some("10.0.0.10".to_string()),
                delete_protection_enabled: request.delete_protection.get().unwrap_or(false),
            },
        );
        Ok(accepted(&id))
    }

    async fn get_virtual_server(&self, id: &str) -> ApiResult<VirtualServer> {
        let mut guard = self.enter("get_virtual_server", id)?;
        let state = &mut *guard;
        state.servers.fetch(id, state.scripts.get_mut(id))
    }

    async fn list_virtual_servers(&self) -> ApiResult<Vec<VirtualServer>> {
        let guard = self.enter("list_virtual_servers", "")?;
        let mut servers: Vec<VirtualServer> = guard.servers.live.values().cloned().collect();
        servers.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(servers)
    }

    async fn resize_virtual_server(
        &self,
        id: &str,
        server_type: &str,
    ) -> ApiResult<AsyncResponse> {
        let mut guard = self.enter("resize_virtual_server", id)?;
        guard
            .servers
            .modify(id, |server| server.server_type = server_type.to_string())?;
        Ok(accepted(id))
    }

    async fn attach_security_group(
        &self,
        id: &str,
        security_group_id: &str,
    ) -> ApiResult<AsyncResponse> {
        let mut guard = self.enter("attach_security_group", security_group_id)?;
        guard.servers.modify(id, |server| {
            server.security_group_ids.push(security_group_id.to_string())
        })?;
        Ok(accepted(id))
    }

    async fn detach_security_group(
        &self,
        id: &str,
        security_group_id: &str,
    ) -> ApiResult<AsyncResponse> {
        let mut guard = self.enter("detach_security_group", security_group_id)?;
        guard.servers.modify(id, |server| {
            server.security_group_ids.retain(|sg| sg != security_group_id)
        })?;
        Ok(accepted(id))
    }

    async fn delete_virtual_server(&self, id: &str) -> ApiResult<()> {
        let mut guard = self.enter("delete_virtual_server", id)?;
        guard.servers.remove(id)
    }
}

#[async_trait]
impl ObjectStorageApi for FakeCloud {
    async fn create_bucket(&self, request: &CreateBucketRequest) -> ApiResult<AsyncResponse> {
        let mut guard = self.enter("create_bucket", "")?;
        let state = &mut *guard;
        let id = state.next_id("bucket");
        state.buckets.insert(
            &id,
            Bucket {
                id: id.clone(),
                name: request.object_storage_bucket_name.clone(),
                state: "ACTIVE".to_string(),
                object_storage_id: request.object_storage_id.clone(),
                versioning_enabled: request.versioning_enabled.get().unwrap_or(false),
            },
        );
        Ok(accepted(&id))
    }

    async fn get_bucket(&self, id: &str) -> ApiResult<Bucket> {
        let mut guard = self.enter("get_bucket", id)?;
        let state = &mut *guard;
        state.buckets.fetch(id, state.scripts.get_mut(id))
    }

    async fn set_bucket_versioning(&self, id: &str, enabled: bool) -> ApiResult<AsyncResponse> {
        let mut guard = self.enter("set_bucket_versioning", id)?;
        guard
            .buckets
            .modify(id, |bucket| bucket.versioning_enabled = enabled)?;
        Ok(accepted(id))
    }

    async fn delete_bucket(&self, id: &str) -> ApiResult<()> {
        let mut guard = self.enter("delete_bucket", id)?;
        guard.buckets.remove(id)
    }
}

#[async_trait]
impl NetworkApi for FakeCloud {
    async fn create_security_group(
        &self,
        request: &CreateSecurityGroupRequest,
    ) -> ApiResult<AsyncResponse> {
        let mut guard = self.enter("create_security_group", "")?;
        let state = &mut *guard;
        let id = state.next_id("sg");
        state.groups.insert(
            &id,
            SecurityGroup {
                id: id.clone(),
                name: request.security_group_name.clone(),
                state: "ACTIVE".to_string(),
                vpc_id: request.vpc_id.clone(),
                description: request.description.clone(),
            },
        );
        Ok(accepted(&id))
    }

    async fn get_security_group(&self, id: &str) -> ApiResult<SecurityGroup> {
        let mut guard = self.enter("get_security_group", id)?;
        let state = &mut *guard;
        state.groups.fetch(id, state.scripts.get_mut(id))
    }

    async fn update_security_group_description(
        &self,
        id: &str,
        description: &str,
    ) -> ApiResult<AsyncResponse> {
        let mut guard = self.enter("update_security_group_description", id)?;
        guard
            .groups
            .modify(id, |group| group.description = description.to_string())?;
        Ok(accepted(id))
    }

    async fn delete_security_group(&self, id: &str) -> ApiResult<()> {
        let mut guard = self.enter("delete_security_group", id)?;
        guard.groups.remove(id)
    }

    async fn create_security_group_rule(
        &self,
        security_group_id: &str,
        request: &CreateSecurityGroupRuleRequest,
    ) -> ApiResult<AsyncResponse> {
        let mut guard = self.enter("create_security_group_rule", security_group_id)?;
        let state = &mut *guard;
        if !state.groups.live.contains_key(security_group_id) {
            return Err(ApiError::not_found(format!(
                "{} not found",
                security_group_id
            )));
        }
        let id = state.next_id("rule");
        state.rules.insert(
            &rule_key(security_group_id, &id),
            SecurityGroupRule {
                id: id.clone(),
                state: "ACTIVE".to_string(),
                direction: request.direction.clone(),
                protocol: request.protocol.clone(),
                port: request.port,
                remote_ip_prefix: request.remote_ip_prefix.clone(),
            },
        );
        Ok(accepted(&id))
    }

    async fn get_security_group_rule(
        &self,
        security_group_id: &str,
        rule_id: &str,
    ) -> ApiResult<SecurityGroupRule> {
        let key = rule_key(security_group_id, rule_id);
        let mut guard = self.enter("get_security_group_rule", &key)?;
        let state = &mut *guard;
        state.rules.fetch(&key, state.scripts.get_mut(&key))
    }

    async fn delete_security_group_rule(
        &self,
        security_group_id: &str,
        rule_id: &str,
    ) -> ApiResult<()> {
        let key = rule_key(security_group_id, rule_id);
        let mut guard = self.enter("delete_security_group_rule", &key)?;
        guard.rules.remove(&key)
    }
}

#[async_trait]
impl DatabaseApi for FakeCloud {
    async fn create_database(&self, request: &CreateDatabaseRequest) -> ApiResult<AsyncResponse> {
        let mut guard = self.enter("create_database", "")?;
        let state = &mut *guard;
        let id = state.next_id("db");
        state.databases.insert(
            &id,
            Database {
                id: id.clone(),
                name: request.database_name.clone(),
                state: "ACTIVE".to_string(),
                engine: request.engine.clone(),
                engine_version: request.engine_version.clone(),
                contract_period: request.contract_period.clone(),
                subnet_id: request.subnet_id.clone(),
                dr_enabled: false,
            },
        );
        Ok(accepted(&id))
    }

    async fn get_database(&self, id: &str) -> ApiResult<Database> {
        let mut guard = self.enter("get_database", id)?;
        let state = &mut *guard;
        state.databases.fetch(id, state.scripts.get_mut(id))
    }

    async fn enable_disaster_recovery(&self, id: &str) -> ApiResult<AsyncResponse> {
        let mut guard = self.enter("enable_disaster_recovery", id)?;
        guard.databases.modify(id, |db| db.dr_enabled = true)?;
        Ok(accepted(id))
    }

    async fn modify_contract(&self, id: &str, contract_period: &str) -> ApiResult<AsyncResponse> {
        let mut guard = self.enter("modify_contract", id)?;
        guard
            .databases
            .modify(id, |db| db.contract_period = contract_period.to_string())?;
        Ok(accepted(id))
    }

    async fn delete_database(&self, id: &str) -> ApiResult<()> {
        let mut guard = self.enter("delete_database", id)?;
        guard.databases.remove(id)
    }
}

#[async_trait]
impl DnsApi for FakeCloud {
    async fn create_dns_record(
        &self,
        request: &CreateDnsRecordRequest,
    ) -> ApiResult<AsyncResponse> {
        let mut guard = self.enter("create_dns_record", "")?;
        let state = &mut *guard;
        let id = state.next_id("record");
        state.records.insert(
            &id,
            DnsRecord {
                id: id.clone(),
                state: "ACTIVE".to_string(),
                dns_domain_id: request.dns_domain_id.clone(),
                record_name: request.record_name.clone(),
                record_type: request.record_type.clone(),
                record_value: request.record_value.clone(),
                ttl: request.ttl,
            },
        );
        Ok(accepted(&id))
    }

    async fn get_dns_record(&self, id: &str) -> ApiResult<DnsRecord> {
        let mut guard = self.enter("get_dns_record", id)?;
        let state = &mut *guard;
        state.records.fetch(id, state.scripts.get_mut(id))
    }

    async fn update_dns_record(
        &self,
        id: &str,
        request: &UpdateDnsRecordRequest,
    ) -> ApiResult<AsyncResponse> {
        let mut guard = self.enter("update_dns_record", id)?;
        guard.records.modify(id, |record| {
            record.record_value = request.record_value.clone();
            record.ttl = request.ttl;
        })?;
        Ok(accepted(id))
    }

    async fn delete_dns_record(&self, id: &str) -> ApiResult<()> {
        let mut guard = self.enter("delete_dns_record", id)?;
        guard.records.remove(id)
    }
}

pub fn test_config() -> ResolvedConfig {
    ResolvedConfig {
        host: "https://openapi.example.com".to_string(),
        project_id: "PROJECT-1".to_string(),
        user_id: "u-1".to_string(),
        email: "ops@example.com".to_string(),
        login_id: "ops@example.com".to_string(),
        auth_method: AuthMethod::AccessKey,
        access_key: "AK".to_string(),
        secret_key: "SK".to_string(),
    }
}

pub fn session(cloud: &Arc<FakeCloud>) -> Session {
    SessionBuilder::new(test_config())
        .with_backend(Arc::clone(cloud))
        .build()
        .unwrap()
}

/// Operation context with a 5 minute deadline and a 3 second poll interval
pub fn context(cloud: &Arc<FakeCloud>) -> OperationContext {
    OperationContext::new(session(cloud))
        .with_timeout(Duration::from_secs(300))
        .with_poll_interval(Duration::from_secs(3))
}
