//! `TickHandler` — C5. Entry point for delayed self-scheduled reconciliation
//! messages; every step after the first.

use tracing::{info, warn};

use crate::adapters::{AlarmApi, LoadBalancerApi, WorkQueue};
use crate::controller::{Controller, StepKnobs};
use crate::error::ControllerError;
use crate::handlers::alarm_event::HandlerResponse;
use crate::listener::ListenerState;
use crate::model::{Action, AlarmState, QueueEnvelope, StatusMessage};

pub struct TickHandler<'a> {
    pub lb: &'a dyn LoadBalancerApi,
    pub alarm: &'a dyn AlarmApi,
    pub queue: &'a dyn WorkQueue,
}

impl<'a> TickHandler<'a> {
    pub fn new(lb: &'a dyn LoadBalancerApi, alarm: &'a dyn AlarmApi, queue: &'a dyn WorkQueue) -> Self {
        Self { lb, alarm, queue }
    }

    /// `raw_body` is the queue's raw message payload — the `{"Records": [...]}`
    /// envelope, not a bare `StatusMessage`. Only `Records[0]` is processed;
    /// any additional records are logged and ignored, since this system only
    /// ever enqueues a single-record batch.
    pub async fn handle(&self, raw_body: &str) -> Result<HandlerResponse, ControllerError> {
        let envelope: QueueEnvelope = serde_json::from_str(raw_body)?;

        let Some(first) = envelope.records.first() else {
            info!("tick invocation delivered an empty batch");
            return Ok(HandlerResponse::ok(Action::None));
        };

        if envelope.records.len() > 1 {
            warn!(extra = envelope.records.len() - 1, "tick batch carried more than one record; ignoring the rest");
        }

        let message = StatusMessage::decode(&first.body)?;
        info!(alarm_name = %message.alarm_name, prior_action = %message.alb_alarm_action, "tick reconciliation");

        let alarm_state = match self.alarm.describe_alarm_state(&message.alarm_name).await {
            Ok(Some(state)) => state,
            Ok(None) => {
                warn!(alarm_name = %message.alarm_name, "alarm not found during tick");
                return Ok(HandlerResponse::ok(Action::None));
            }
            Err(err) => {
                warn!(alarm_name = %message.alarm_name, error = %err, "alarm query failed during tick; treating as not found");
                return Ok(HandlerResponse::ok(Action::None));
            }
        };

        let mut state = ListenerState::load(self.lb, &message.elb_listener_arn).await;
        let knobs = StepKnobs {
            shed_step_pct: message.elb_shed_percent,
            max_shed_pct: message.max_elb_shed_percent,
            restore_step_pct: message.elb_restore_percent,
        };

        let action = Controller::decide_tick(&mut state, alarm_state, message.alb_alarm_action, &message.target_group_arn, knobs);

        // Only the (ALARM, prior=SHED) and (OK, prior=RESTORE) rows of the
        // tick decision table actually mutate weights; the hysteresis rows
        // and INSUFFICIENT_DATA leave `state` untouched, so persisting there
        // would be a wasted LB write.
        let mutated = matches!(
            (alarm_state, message.alb_alarm_action),
            (AlarmState::Alarm, Action::Shed) | (AlarmState::Ok, Action::Restore)
        );
        if mutated {
            state
                .persist(self.lb, &message.elb_listener_arn)
                .await
                .map_err(ControllerError::ListenerWrite)?;
        }

        Controller::reenqueue(self.queue, &message.sqs_queue_url, action, &message).await?;

        Ok(HandlerResponse::ok(action))
    }
}
