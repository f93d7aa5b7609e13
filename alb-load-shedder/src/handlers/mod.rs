//! Lambda entry points — C4 and C5.

pub mod alarm_event;
pub mod tick;

pub use alarm_event::{AlarmEventHandler, AlarmStateChangeEvent, HandlerResponse};
pub use tick::TickHandler;
