//! StatusMessage codec — C6.
//!
//! The self-describing reconciliation envelope carried forward between
//! ticks. Field names are pinned to the exact external wire format with
//! per-field `serde(rename)` rather than a blanket `rename_all = "camelCase"`,
//! because `sqsQueueURL` does not follow camelCase (`URL`, not `Url`).

use serde::{Deserialize, Serialize};

use super::alarm::Action;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    #[serde(rename = "albAlarmAction")]
    pub alb_alarm_action: Action,
    #[serde(rename = "alarmArn")]
    pub alarm_arn: String,
    #[serde(rename = "alarmName")]
    pub alarm_name: String,
    #[serde(rename = "elbListenerArn")]
    pub elb_listener_arn: String,
    #[serde(rename = "elbShedPercent")]
    pub elb_shed_percent: u32,
    #[serde(rename = "maxElbShedPercent")]
    pub max_elb_shed_percent: u32,
    #[serde(rename = "elbRestorePercent")]
    pub elb_restore_percent: u32,
    #[serde(rename = "loadBalancerArn")]
    pub load_balancer_arn: String,
    #[serde(rename = "sqsQueueURL")]
    pub sqs_queue_url: String,
    #[serde(rename = "shedMesgDelaySec")]
    pub shed_mesg_delay_sec: u32,
    #[serde(rename = "restoreMesgDelaySec")]
    pub restore_mesg_delay_sec: u32,
    #[serde(rename = "targetGroupArn")]
    pub target_group_arn: String,
}

impl StatusMessage {
    pub fn delay_for(&self, action: Action) -> u32 {
        match action {
            Action::Restore => self.restore_mesg_delay_sec,
            _ => self.shed_mesg_delay_sec,
        }
    }

    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn decode(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }
}

/// The queue envelope the tick handler receives: `{"Records":[{"body": "..."}]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueEnvelope {
    #[serde(rename = "Records")]
    pub records: Vec<QueueRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueRecord {
    pub body: String,
}
