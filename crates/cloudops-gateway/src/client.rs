//! Retrying client for the action-dispatch endpoint.
//!
//! Every attempt goes through the injected [`ActionTransport`]; its outcome is
//! normalised into one `GatewayResult` before classification, so transport
//! failures and `{error}` envelopes are retried (or not) by the same rule.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde::Serialize;

use crate::transport::{ActionParams, ActionTransport};
use crate::types::{GatewayError, GatewayResult};

/// Default attempt budget per invocation.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Delay before the second attempt (doubled for each further attempt).
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Sleep after the failed attempt `attempt` (zero-indexed): `base * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .unwrap_or(Duration::MAX)
    }
}

/// Gateway client. Cloning shares the underlying transport.
#[derive(Clone)]
pub struct GatewayClient {
    transport: Arc<dyn ActionTransport>,
    policy: RetryPolicy,
}

impl GatewayClient {
    pub fn new(transport: Arc<dyn ActionTransport>) -> Self {
        Self::with_policy(transport, RetryPolicy::default())
    }

    pub fn with_policy(transport: Arc<dyn ActionTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Invoke `action` with the default attempt budget.
    pub async fn invoke<P: Serialize + ?Sized>(
        &self,
        action: &str,
        params: &P,
    ) -> GatewayResult<serde_json::Value> {
        self.invoke_with_attempts(action, params, self.policy.max_attempts)
            .await
    }

    /// Invoke `action`, performing at most `max_attempts` remote calls
    /// (at least one).
    pub async fn invoke_with_attempts<P: Serialize + ?Sized>(
        &self,
        action: &str,
        params: &P,
        max_attempts: u32,
    ) -> GatewayResult<serde_json::Value> {
        let params = to_params(params)?;
        let max_attempts = max_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..max_attempts {
            let outcome = self
                .transport
                .call(action, &params)
                .await
                .and_then(|resp| resp.into_result());

            let err = match outcome {
                Ok(data) => {
                    debug!("gateway {} succeeded on attempt {}", action, attempt + 1);
                    return Ok(data);
                }
                Err(e) => e,
            };

            if err.is_terminal() {
                warn!("gateway {} failed with terminal error: {}", action, err);
                return Err(err);
            }

            if attempt + 1 < max_attempts {
                let delay = self.policy.delay_for(attempt);
                warn!(
                    "gateway {} attempt {}/{} failed: {} – retrying in {}ms",
                    action,
                    attempt + 1,
                    max_attempts,
                    err,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            last_error = Some(err);
        }

        let err = last_error
            .unwrap_or_else(|| GatewayError::network(format!("{action}: no attempt was made")));
        warn!("gateway {} giving up after {} attempts: {}", action, max_attempts, err);
        Err(err)
    }
}

/// Serialise caller parameters into the object merged with the action name.
fn to_params<P: Serialize + ?Sized>(params: &P) -> GatewayResult<ActionParams> {
    match serde_json::to_value(params) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(serde_json::Value::Null) => Ok(ActionParams::new()),
        Ok(other) => Err(GatewayError::configuration(format!(
            "Action parameters not configured as an object: {other}"
        ))),
        Err(e) => Err(GatewayError::configuration(format!(
            "Action parameters not configured correctly: {e}"
        ))),
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
