//! `Controller` — C3, the decision state machine.
//!
//! Orchestrates one decision cycle: given the current alarm state and the
//! prior action, chooses the next action, mutates `ListenerState`
//! accordingly, and (via the caller) re-enqueues the next tick.

use tracing::warn;

use crate::adapters::WorkQueue;
use crate::error::ControllerError;
use crate::listener::ListenerState;
use crate::model::{Action, AlarmState, StatusMessage};

/// The numeric knobs a decision needs, independent of where they came from
/// (environment config on first contact, the carried-forward `StatusMessage`
/// on a tick).
#[derive(Debug, Clone, Copy)]
pub struct StepKnobs {
    pub shed_step_pct: u32,
    pub max_shed_pct: u32,
    pub restore_step_pct: u32,
}

pub struct Controller;

impl Controller {
    /// First-contact decision — §4.3.1. Only reachable from an alarm
    /// state-change event, so `INSUFFICIENT_DATA` cannot occur here in
    /// practice; it is handled defensively anyway (treated as `Action::None`,
    /// per the spec's open-question resolution) rather than assumed
    /// unreachable.
    pub fn decide_first_contact(
        state: &mut ListenerState,
        alarm: AlarmState,
        source: &str,
        knobs: StepKnobs,
    ) -> Action {
        match alarm {
            AlarmState::Alarm => {
                state.shed_all(source, knobs.shed_step_pct, knobs.max_shed_pct);
                if state.any_sheddable(source, knobs.max_shed_pct) {
                    Action::Shed
                } else {
                    Action::None
                }
            }
            AlarmState::Ok => Action::Restore,
            AlarmState::InsufficientData => {
                warn!("first-contact invocation observed INSUFFICIENT_DATA; treating as no-op");
                Action::None
            }
        }
    }

    /// Tick decision — §4.3.2. `prior` is the action recorded in the
    /// delivered `StatusMessage`.
    pub fn decide_tick(state: &mut ListenerState, alarm: AlarmState, prior: Action, source: &str, knobs: StepKnobs) -> Action {
        match (alarm, prior) {
            (AlarmState::Alarm, Action::Shed) => {
                state.shed_all(source, knobs.shed_step_pct, knobs.max_shed_pct);
                if state.any_sheddable(source, knobs.max_shed_pct) {
                    Action::Shed
                } else {
                    Action::None
                }
            }
            (AlarmState::Alarm, Action::Restore) => {
                if state.any_sheddable(source, knobs.max_shed_pct) {
                    Action::Shed
                } else {
                    Action::None
                }
            }
            (AlarmState::Ok, Action::Restore) => {
                state.restore_all(source, knobs.restore_step_pct);
                if state.any_restorable(source) {
                    Action::Restore
                } else {
                    Action::None
                }
            }
            (AlarmState::Ok, Action::Shed) => {
                if state.any_restorable(source) {
                    Action::Restore
                } else {
                    Action::None
                }
            }
            (AlarmState::InsufficientData, prior) => prior,
            // `prior_action == NONE` never reaches a tick: NONE terminates
            // the episode and nothing gets re-enqueued. Reachable only if an
            // external caller hand-crafts a message; treat as a no-op.
            (_, Action::None) => {
                warn!(?alarm, "tick delivered with prior_action=NONE; treating as no-op");
                Action::None
            }
        }
    }

    /// Re-enqueue rule — §4.3.3. If `new_action` is `Shed` or `Restore`,
    /// builds the next `StatusMessage` (carrying `new_action` forward as
    /// `prior_action` for the next tick) and enqueues it with the
    /// corresponding delay. `Action::None` enqueues nothing — the episode
    /// ends.
    pub async fn reenqueue(
        queue: &dyn WorkQueue,
        queue_url: &str,
        new_action: Action,
        template: &StatusMessage,
    ) -> Result<(), ControllerError> {
        if new_action == Action::None {
            return Ok(());
        }

        let mut next = template.clone();
        next.alb_alarm_action = new_action;
        let delay = next.delay_for(new_action);

        let body = next.encode().map_err(ControllerError::MalformedMessage)?;
        queue
            .enqueue(queue_url, delay, body)
            .await
            .map_err(ControllerError::Enqueue)
    }
}
