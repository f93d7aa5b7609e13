pub mod alarm;
pub mod status_message;
pub mod weight;

pub use alarm::{Action, AlarmState};
pub use status_message::{QueueEnvelope, QueueRecord, StatusMessage};
pub use weight::RuleWeights;
