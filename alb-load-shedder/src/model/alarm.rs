//! Closed enums for the alarm state reported by the metric source and the
//! action chosen by the controller.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmState {
    Ok,
    Alarm,
    InsufficientData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    None,
    Shed,
    Restore,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Shed => write!(f, "SHED"),
            Self::Restore => write!(f, "RESTORE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alarm_state_round_trips_through_json() {
        for s in [AlarmState::Ok, AlarmState::Alarm, AlarmState::InsufficientData] {
            let json = serde_json::to_string(&s).unwrap();
            let back: AlarmState = serde_json::from_str(&json).unwrap();
            assert_eq!(s, back);
        }
        assert_eq!(serde_json::to_string(&AlarmState::InsufficientData).unwrap(), "\"INSUFFICIENT_DATA\"");
    }

    #[test]
    fn action_round_trips_through_json() {
        for a in [Action::None, Action::Shed, Action::Restore] {
            let json = serde_json::to_string(&a).unwrap();
            let back: Action = serde_json::from_str(&json).unwrap();
            assert_eq!(a, back);
        }
    }
}
