//! Scripted in-memory transport for tests.
//!
//! Outcomes are queued per action and replayed in call order. An action with
//! an `always` outcome repeats it once its queue is drained. Unscripted calls
//! fail with a retryable server error.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::transport::{ActionParams, ActionResponse, ActionTransport};
use crate::types::{GatewayError, GatewayResult};

type Outcome = GatewayResult<ActionResponse>;

#[derive(Clone)]
struct Step {
    delay: Duration,
    outcome: Outcome,
}

#[derive(Default)]
struct Script {
    queued: HashMap<String, VecDeque<Step>>,
    fallback: HashMap<String, Step>,
    calls: HashMap<String, Vec<(Instant, ActionParams)>>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<Script>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one outcome for `action`.
    pub fn push(&self, action: &str, outcome: Outcome) {
        self.push_delayed(action, Duration::ZERO, outcome);
    }

    /// Queue one outcome that resolves after `delay`.
    pub fn push_delayed(&self, action: &str, delay: Duration, outcome: Outcome) {
        self.lock()
            .queued
            .entry(action.to_string())
            .or_default()
            .push_back(Step { delay, outcome });
    }

    /// Outcome used for `action` whenever its queue is empty.
    pub fn always(&self, action: &str, outcome: Outcome) {
        self.lock().fallback.insert(
            action.to_string(),
            Step {
                delay: Duration::ZERO,
                outcome,
            },
        );
    }

    pub fn calls(&self, action: &str) -> usize {
        self.lock().calls.get(action).map(Vec::len).unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.lock().calls.values().map(Vec::len).sum()
    }

    pub fn call_times(&self, action: &str) -> Vec<Instant> {
        self.lock()
            .calls
            .get(action)
            .map(|c| c.iter().map(|(t, _)| *t).collect())
            .unwrap_or_default()
    }

    pub fn last_params(&self, action: &str) -> Option<ActionParams> {
        self.lock()
            .calls
            .get(action)
            .and_then(|c| c.last())
            .map(|(_, p)| p.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ActionTransport for ScriptedTransport {
    async fn call(&self, action: &str, params: &ActionParams) -> GatewayResult<ActionResponse> {
        let step = {
            let mut script = self.lock();
            script
                .calls
                .entry(action.to_string())
                .or_default()
                .push((Instant::now(), params.clone()));
            let queued = script.queued.get_mut(action).and_then(VecDeque::pop_front);
            match queued {
                Some(step) => Some(step),
                None => script.fallback.get(action).cloned(),
            }
        };

        match step {
            Some(step) => {
                if !step.delay.is_zero() {
                    tokio::time::sleep(step.delay).await;
                }
                step.outcome
            }
            None => Err(GatewayError::server(format!(
                "no scripted response for action {action}"
            ))),
        }
    }
}
