//! External adapters — C7. Thin seams over the load-balancer control API,
//! the alarm query API, and the delayed work queue. Production
//! implementations live in [`aws`]; tests substitute [`memory`]'s in-memory
//! doubles, per the dependency-injection guidance in the spec's design
//! notes.

pub mod aws;
pub mod memory;

use async_trait::async_trait;

use crate::model::AlarmState;

/// One action entry from `DescribeRules`, as relevant to this controller.
#[derive(Debug, Clone)]
pub struct DescribedAction {
    pub action_type: String,
    pub forward_targets: Vec<(String, u32)>,
}

/// One rule entry from `DescribeRules`.
#[derive(Debug, Clone)]
pub struct DescribedRule {
    pub rule_arn: String,
    pub is_default: bool,
    pub actions: Vec<DescribedAction>,
}

/// Opaque shim over the ALB/ELBv2 control plane: "describe rules" and
/// "modify rule/listener default action".
#[async_trait]
pub trait LoadBalancerApi: Send + Sync {
    async fn describe_rules(&self, listener_arn: &str) -> anyhow::Result<Vec<DescribedRule>>;

    async fn modify_rule(&self, rule_arn: &str, target_groups: &[(String, u32)]) -> anyhow::Result<()>;

    async fn modify_listener_default(
        &self,
        listener_arn: &str,
        target_groups: &[(String, u32)],
    ) -> anyhow::Result<()>;
}

/// Opaque shim over the metric alarm engine: reports one of three states on
/// demand, or `Ok(None)` if the named alarm does not exist.
#[async_trait]
pub trait AlarmApi: Send + Sync {
    async fn describe_alarm_state(&self, alarm_name: &str) -> anyhow::Result<Option<AlarmState>>;
}

/// Opaque shim over the delayed-delivery work queue.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    async fn enqueue(&self, queue_url: &str, delay_seconds: u32, body: String) -> anyhow::Result<()>;
}
