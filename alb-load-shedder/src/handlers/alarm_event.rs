//! `AlarmEventHandler` — C4. Entry point for CloudWatch alarm state-change
//! notifications; the first step of a shed/restore episode.

use serde::Deserialize;
use tracing::info;

use crate::adapters::{LoadBalancerApi, WorkQueue};
use crate::config::Config;
use crate::controller::{Controller, StepKnobs};
use crate::error::ControllerError;
use crate::listener::ListenerState;
use crate::model::{Action, AlarmState, StatusMessage};

const EXPECTED_DETAIL_TYPE: &str = "CloudWatch Alarm State Change";

/// The subset of an EventBridge "CloudWatch Alarm State Change" event this
/// handler needs. Deliberately loose (`#[serde(rename_all = "kebab-case")]`
/// on the outer envelope, nested structs for `detail`) rather than modeling
/// every field CloudWatch can emit.
#[derive(Debug, Deserialize)]
pub struct AlarmStateChangeEvent {
    pub id: String,
    #[serde(rename = "detail-type")]
    pub detail_type: String,
    pub resources: Vec<String>,
    pub account: String,
    pub region: String,
    pub detail: AlarmStateChangeDetail,
}

#[derive(Debug, Deserialize)]
pub struct AlarmStateChangeDetail {
    #[serde(rename = "alarmName")]
    pub alarm_name: String,
    pub state: AlarmStateDetail,
    pub configuration: AlarmConfiguration,
}

#[derive(Debug, Deserialize)]
pub struct AlarmStateDetail {
    pub value: AlarmState,
}

#[derive(Debug, Deserialize)]
pub struct AlarmConfiguration {
    pub metrics: Vec<AlarmMetric>,
}

#[derive(Debug, Deserialize)]
pub struct AlarmMetric {
    #[serde(rename = "metricStat")]
    pub metric_stat: MetricStat,
}

#[derive(Debug, Deserialize)]
pub struct MetricStat {
    pub metric: MetricDescriptor,
}

#[derive(Debug, Deserialize)]
pub struct MetricDescriptor {
    pub dimensions: MetricDimensions,
}

#[derive(Debug, Deserialize)]
pub struct MetricDimensions {
    #[serde(rename = "TargetGroup")]
    pub target_group: String,
}

/// `{ statusCode, message }`, per §6's return-value contract.
#[derive(Debug, serde::Serialize, PartialEq, Eq)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
}

impl HandlerResponse {
    /// C5's (tick handler's) success message — `'New Alarm State:' + action`.
    pub(crate) fn ok(action: Action) -> Self {
        Self { status_code: 200, message: format!("New Alarm State:{action}") }
    }

    /// C4's (alarm-event handler's) success message — `'Processed alarm:' + action`.
    fn processed(action: Action) -> Self {
        Self { status_code: 200, message: format!("Processed alarm:{action}") }
    }

    fn rejected() -> Self {
        Self { status_code: 403, message: "Unsupported event type…".to_string() }
    }
}

/// Reconstructs the primary target group's ARN from the region, account,
/// and target-group dimension carried by the alarm's metric configuration —
/// the template from §6.
pub fn reconstruct_target_group_arn(region: &str, account: &str, target_group_dimension: &str) -> String {
    format!("arn:aws:elasticloadbalancing:{region}:{account}:{target_group_dimension}")
}

pub struct AlarmEventHandler<'a> {
    pub lb: &'a dyn LoadBalancerApi,
    pub queue: &'a dyn WorkQueue,
    pub config: &'a Config,
}

impl<'a> AlarmEventHandler<'a> {
    pub fn new(lb: &'a dyn LoadBalancerApi, queue: &'a dyn WorkQueue, config: &'a Config) -> Self {
        Self { lb, queue, config }
    }

    pub async fn handle(&self, event: &AlarmStateChangeEvent) -> Result<HandlerResponse, ControllerError> {
        info!(event_id = %event.id, detail_type = %event.detail_type, "received alarm state-change event");

        if event.detail_type != EXPECTED_DETAIL_TYPE {
            return Ok(HandlerResponse::rejected());
        }

        let target_group_arn = reconstruct_target_group_arn(
            &event.region,
            &event.account,
            &event.detail.configuration.metrics[0].metric_stat.metric.dimensions.target_group,
        );

        let alarm_arn = event.resources.first().cloned().unwrap_or_default();
        let alarm_state = event.detail.state.value;

        let mut state = ListenerState::load(self.lb, &self.config.elb_listener_arn).await;
        let knobs = StepKnobs {
            shed_step_pct: self.config.elb_shed_percent,
            max_shed_pct: self.config.max_elb_shed_percent,
            restore_step_pct: self.config.elb_restore_percent,
        };

        let action = Controller::decide_first_contact(&mut state, alarm_state, &target_group_arn, knobs);

        // Only the ALARM row of the first-contact table mutates weights
        // (`shed_all`, persisted unconditionally even if that single step
        // lands the rule exactly at the cap and the returned action is
        // already NONE); OK never mutates on first contact, so persisting
        // there would be a wasted LB write of an unchanged rule set.
        if alarm_state == AlarmState::Alarm {
            state
                .persist(self.lb, &self.config.elb_listener_arn)
                .await
                .map_err(ControllerError::ListenerWrite)?;
        }

        let template = StatusMessage {
            alb_alarm_action: action,
            alarm_arn,
            alarm_name: event.detail.alarm_name.clone(),
            elb_listener_arn: self.config.elb_listener_arn.clone(),
            elb_shed_percent: self.config.elb_shed_percent,
            max_elb_shed_percent: self.config.max_elb_shed_percent,
            elb_restore_percent: self.config.elb_restore_percent,
            load_balancer_arn: self.config.elb_arn.clone(),
            sqs_queue_url: self.config.sqs_queue_url.clone(),
            shed_mesg_delay_sec: self.config.shed_mesg_delay_sec,
            restore_mesg_delay_sec: self.config.restore_mesg_delay_sec,
            target_group_arn,
        };

        Controller::reenqueue(self.queue, &self.config.sqs_queue_url, action, &template).await?;

        Ok(HandlerResponse::processed(action))
    }
}
