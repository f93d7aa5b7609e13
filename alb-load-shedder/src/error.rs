//! Error taxonomy — §7 of the specification.
//!
//! `ListenerRead` failures and "alarm not found" are deliberately *not*
//! variants here: per the spec they are recovered locally (empty
//! `ListenerState`, `Action::None`) and never propagate past the component
//! that observed them. Only the genuinely fatal cases — a write the LB
//! rejected, a queue that refused an enqueue, or a malformed inbound
//! payload — reach the handler boundary as `Err`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("failed to persist listener rule state: {0}")]
    ListenerWrite(#[source] anyhow::Error),

    #[error("failed to enqueue reconciliation message: {0}")]
    Enqueue(#[source] anyhow::Error),

    #[error("malformed alarm event: {0}")]
    MalformedEvent(String),

    #[error("malformed status message body: {0}")]
    MalformedMessage(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("environment variable {name} must be an integer, got {value:?}")]
    NotAnInteger { name: &'static str, value: String },

    #[error("environment variable {name}={value} is out of range {min}..={max}")]
    OutOfRange { name: &'static str, value: i64, min: i64, max: i64 },
}
