//! Status polling
//!
//! [`wait_for_status`] polls a reader until the remote resource reaches a
//! target state, treating "not found" according to the policy. Sleeps go
//! through `tokio::time`, so tests drive it with a paused clock.

use crate::api::ApiResult;
use crate::cancel::CancelToken;
use crate::config::{DEFAULT_OPERATION_TIMEOUT, DEFAULT_POLL_INTERVAL};
use crate::error::{CloudError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

pub const CREATING: &str = "CREATING";
pub const EDITING: &str = "EDITING";
pub const UPDATING: &str = "UPDATING";
pub const TERMINATING: &str = "TERMINATING";
pub const ACTIVE: &str = "ACTIVE";
pub const DELETED: &str = "DELETED";

/// State reported when the reader gets 404/403 and not-found is fatal
pub const NOT_FOUND: &str = "NOT_FOUND";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Sleep between polls
    pub interval: Duration,
    /// Give up after this instant
    pub deadline: Instant,
    /// Sleep before the first poll
    pub grace: Duration,
    pub pending: Vec<String>,
    pub target: Vec<String>,
    /// When false, 404/403 from the reader counts as `DELETED`
    pub fail_on_not_found: bool,
}

impl WaitPolicy {
    pub fn new(pending: &[&str], target: &[&str]) -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            deadline: Instant::now() + DEFAULT_OPERATION_TIMEOUT,
            grace: Duration::ZERO,
            pending: pending.iter().map(|s| s.to_string()).collect(),
            target: target.iter().map(|s| s.to_string()).collect(),
            fail_on_not_found: true,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now() + timeout;
        self
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn fail_on_not_found(mut self, fail: bool) -> Self {
        self.fail_on_not_found = fail;
        self
    }

    fn is_target(&self, state: &str) -> bool {
        self.target.iter().any(|s| s == state)
    }

    fn is_pending(&self, state: &str) -> bool {
        self.pending.iter().any(|s| s == state)
    }
}

/// Poll `reader` until the resource reaches a target state
///
/// Returns the observed target state. A state outside both sets fails with
/// `UnexpectedState`; passing the deadline fails with `Timeout`.
pub async fn wait_for_status<F, Fut>(
    id: &str,
    policy: &WaitPolicy,
    cancel: &CancelToken,
    mut reader: F,
) -> Result<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = ApiResult<String>>,
{
    if !policy.grace.is_zero() {
        tracing::debug!(id, grace = ?policy.grace, "Waiting before first status poll");
        cancel.guard(tokio::time::sleep(policy.grace)).await?;
    }

    let mut attempt = 0u32;
    loop {
        cancel.check()?;
        attempt += 1;

        let state = match cancel.guard(reader(id.to_string())).await? {
            Ok(state) => state,
            Err(e) if e.is_gone() && !policy.fail_on_not_found => DELETED.to_string(),
            Err(e) if e.is_gone() => {
                return Err(CloudError::UnexpectedState {
                    id: id.to_string(),
                    state: NOT_FOUND.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(id, attempt, state = %state, "Polled resource status");

        if policy.is_target(&state) {
            return Ok(state);
        }
        if !policy.is_pending(&state) {
            return Err(CloudError::UnexpectedState {
                id: id.to_string(),
                state,
            });
        }

        let now = Instant::now();
        if now >= policy.deadline {
            return Err(CloudError::Timeout(format!(
                "{} still {} after {} polls",
                id, state, attempt
            )));
        }
        let wake = (now + policy.interval).min(policy.deadline);
        cancel.guard(tokio::time::sleep_until(wake)).await?;
    }
}
