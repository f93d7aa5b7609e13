//! ALB target-group load-shedding controller.
//!
//! A closed-loop controller that shifts weighted forwarding between an
//! application load balancer's target groups as a monitored CloudWatch
//! alarm transitions between states, stepping in bounded increments at a
//! delayed, self-scheduled cadence. See [`controller`] for the decision
//! state machine and [`model::weight`] for the underlying weight algebra.

pub mod adapters;
pub mod config;
pub mod controller;
pub mod error;
pub mod handlers;
pub mod listener;
pub mod model;
