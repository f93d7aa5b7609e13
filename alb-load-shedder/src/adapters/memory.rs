//! In-memory test doubles for [`LoadBalancerApi`], [`AlarmApi`], and
//! [`WorkQueue`]. Pre-seedable and call-recording; used throughout the test
//! suite in place of the production AWS adapters.

use std::sync::Mutex;

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::adapters::{AlarmApi, DescribedAction, DescribedRule, LoadBalancerApi, WorkQueue};
use crate::model::AlarmState;

#[derive(Debug, Clone)]
pub struct EnqueuedMessage {
    pub queue_url: String,
    pub delay_seconds: u32,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct RecordedModify {
    pub target_arn: String,
    pub target_groups: Vec<(String, u32)>,
    pub is_default_action: bool,
}

/// Seeded with [`DescribedRule`]s; records every `modify_rule` /
/// `modify_listener_default` call it receives so tests can assert on the
/// final weights written, not just the in-memory state.
#[derive(Default)]
pub struct InMemoryLoadBalancer {
    rules: Mutex<IndexMap<String, Vec<DescribedRule>>>,
    modifications: Mutex<Vec<RecordedModify>>,
}

impl InMemoryLoadBalancer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, listener_arn: impl Into<String>, rules: Vec<DescribedRule>) {
        self.rules.lock().expect("lock poisoned").insert(listener_arn.into(), rules);
    }

    pub fn modifications(&self) -> Vec<RecordedModify> {
        self.modifications.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl LoadBalancerApi for InMemoryLoadBalancer {
    async fn describe_rules(&self, listener_arn: &str) -> anyhow::Result<Vec<DescribedRule>> {
        Ok(self
            .rules
            .lock()
            .expect("lock poisoned")
            .get(listener_arn)
            .cloned()
            .unwrap_or_default())
    }

    async fn modify_rule(&self, rule_arn: &str, target_groups: &[(String, u32)]) -> anyhow::Result<()> {
        self.modifications.lock().expect("lock poisoned").push(RecordedModify {
            target_arn: rule_arn.to_string(),
            target_groups: target_groups.to_vec(),
            is_default_action: false,
        });
        Ok(())
    }

    async fn modify_listener_default(
        &self,
        listener_arn: &str,
        target_groups: &[(String, u32)],
    ) -> anyhow::Result<()> {
        self.modifications.lock().expect("lock poisoned").push(RecordedModify {
            target_arn: listener_arn.to_string(),
            target_groups: target_groups.to_vec(),
            is_default_action: true,
        });
        Ok(())
    }
}

/// Seeded with a single [`AlarmState`] per alarm name; `None` (or an
/// unseeded name) reports "alarm not found".
#[derive(Default)]
pub struct InMemoryAlarm {
    states: Mutex<IndexMap<String, AlarmState>>,
}

impl InMemoryAlarm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, alarm_name: impl Into<String>, state: AlarmState) {
        self.states.lock().expect("lock poisoned").insert(alarm_name.into(), state);
    }
}

#[async_trait]
impl AlarmApi for InMemoryAlarm {
    async fn describe_alarm_state(&self, alarm_name: &str) -> anyhow::Result<Option<AlarmState>> {
        Ok(self.states.lock().expect("lock poisoned").get(alarm_name).copied())
    }
}

/// Records every enqueued message in arrival order; never actually delays.
#[derive(Default)]
pub struct InMemoryQueue {
    messages: Mutex<Vec<EnqueuedMessage>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<EnqueuedMessage> {
        self.messages.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl WorkQueue for InMemoryQueue {
    async fn enqueue(&self, queue_url: &str, delay_seconds: u32, body: String) -> anyhow::Result<()> {
        self.messages.lock().expect("lock poisoned").push(EnqueuedMessage {
            queue_url: queue_url.to_string(),
            delay_seconds,
            body,
        });
        Ok(())
    }
}
