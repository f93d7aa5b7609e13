//! Production adapters over the real AWS SDK clients.
//!
//! Thin shims only: all weight algebra and decision logic lives in
//! [`crate::model`] and [`crate::controller`]. These adapters translate
//! between that domain model and the wire shapes `aws-sdk-*` expects.

use async_trait::async_trait;
use aws_sdk_cloudwatch::types::StateValue;
use aws_sdk_elasticloadbalancingv2::types::{
    Action as ElbAction, ActionTypeEnum, ForwardActionConfig, TargetGroupStickinessConfig, TargetGroupTuple,
};
use tracing::debug;

use crate::adapters::{AlarmApi, DescribedAction, DescribedRule, LoadBalancerApi, WorkQueue};
use crate::model::AlarmState;

/// `TargetGroupTuple` has no required members, so its generated `build()`
/// is infallible — unlike `ForwardActionConfig`/`Action` below, which do
/// have required fields and return a `Result`.
fn target_group_tuples(target_groups: &[(String, u32)]) -> Vec<TargetGroupTuple> {
    target_groups
        .iter()
        .map(|(arn, weight)| TargetGroupTuple::builder().target_group_arn(arn).weight(*weight as i32).build())
        .collect()
}

fn forward_action(target_groups: &[(String, u32)]) -> anyhow::Result<ElbAction> {
    let forward_config = ForwardActionConfig::builder()
        .set_target_groups(Some(target_group_tuples(target_groups)))
        .target_group_stickiness_config(TargetGroupStickinessConfig::builder().enabled(false).build())
        .build();

    Ok(ElbAction::builder()
        .r#type(ActionTypeEnum::Forward)
        .forward_config(forward_config)
        .build()?)
}

pub struct ElbLoadBalancer {
    client: aws_sdk_elasticloadbalancingv2::Client,
}

impl ElbLoadBalancer {
    pub fn new(client: aws_sdk_elasticloadbalancingv2::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LoadBalancerApi for ElbLoadBalancer {
    async fn describe_rules(&self, listener_arn: &str) -> anyhow::Result<Vec<DescribedRule>> {
        let response = self
            .client
            .describe_rules()
            .listener_arn(listener_arn)
            .send()
            .await?;

        let rules = response
            .rules()
            .iter()
            .map(|rule| DescribedRule {
                rule_arn: rule.rule_arn().unwrap_or_default().to_string(),
                is_default: rule.is_default(),
                actions: rule
                    .actions()
                    .iter()
                    .map(|action| DescribedAction {
                        action_type: action.r#type().as_str().to_string(),
                        forward_targets: action
                            .forward_config()
                            .map(|fc| {
                                fc.target_groups()
                                    .iter()
                                    .map(|tg| {
                                        (
                                            tg.target_group_arn().unwrap_or_default().to_string(),
                                            tg.weight().unwrap_or(0) as u32,
                                        )
                                    })
                                    .collect()
                            })
                            .unwrap_or_default(),
                    })
                    .collect(),
            })
            .collect();

        Ok(rules)
    }

    async fn modify_rule(&self, rule_arn: &str, target_groups: &[(String, u32)]) -> anyhow::Result<()> {
        debug!(rule_arn, "modifying rule forward config");
        self.client
            .modify_rule()
            .rule_arn(rule_arn)
            .actions(forward_action(target_groups)?)
            .send()
            .await?;
        Ok(())
    }

    async fn modify_listener_default(
        &self,
        listener_arn: &str,
        target_groups: &[(String, u32)],
    ) -> anyhow::Result<()> {
        debug!(listener_arn, "modifying listener default action");
        self.client
            .modify_listener()
            .listener_arn(listener_arn)
            .default_actions(forward_action(target_groups)?)
            .send()
            .await?;
        Ok(())
    }
}

pub struct CloudWatchAlarm {
    client: aws_sdk_cloudwatch::Client,
}

impl CloudWatchAlarm {
    pub fn new(client: aws_sdk_cloudwatch::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AlarmApi for CloudWatchAlarm {
    async fn describe_alarm_state(&self, alarm_name: &str) -> anyhow::Result<Option<AlarmState>> {
        let response = self
            .client
            .describe_alarms()
            .alarm_names(alarm_name)
            .send()
            .await?;

        let Some(alarm) = response.metric_alarms().first() else {
            return Ok(None);
        };

        let state = match alarm.state_value() {
            Some(StateValue::Ok) => AlarmState::Ok,
            Some(StateValue::Alarm) => AlarmState::Alarm,
            Some(StateValue::InsufficientData) => AlarmState::InsufficientData,
            _ => return Ok(None),
        };

        Ok(Some(state))
    }
}

pub struct SqsWorkQueue {
    client: aws_sdk_sqs::Client,
}

impl SqsWorkQueue {
    pub fn new(client: aws_sdk_sqs::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WorkQueue for SqsWorkQueue {
    async fn enqueue(&self, queue_url: &str, delay_seconds: u32, body: String) -> anyhow::Result<()> {
        self.client
            .send_message()
            .queue_url(queue_url)
            .delay_seconds(delay_seconds as i32)
            .message_body(body)
            .send()
            .await?;
        Ok(())
    }
}
