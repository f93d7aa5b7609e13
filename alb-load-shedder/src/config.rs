//! Environment-variable configuration — §6.
//!
//! Read once per invocation (there is no persistent process state between
//! handler invocations, so there is nothing to cache this in).

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub elb_arn: String,
    pub elb_listener_arn: String,
    pub sqs_queue_url: String,
    pub elb_shed_percent: u32,
    pub max_elb_shed_percent: u32,
    pub elb_restore_percent: u32,
    pub shed_mesg_delay_sec: u32,
    pub restore_mesg_delay_sec: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Testable construction: `lookup` stands in for `std::env::var` so
    /// tests can exercise missing/invalid/out-of-range values without
    /// mutating process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let int_in_range = |name: &'static str, default: u32, min: u32, max: u32| -> Result<u32, ConfigError> {
            let raw = match lookup(name) {
                Some(v) => v,
                None => return Ok(default),
            };
            let parsed: i64 = raw.parse().map_err(|_| ConfigError::NotAnInteger { name, value: raw.clone() })?;
            if parsed < min as i64 || parsed > max as i64 {
                return Err(ConfigError::OutOfRange { name, value: parsed, min: min as i64, max: max as i64 });
            }
            Ok(parsed as u32)
        };

        Ok(Config {
            elb_arn: required("ELB_ARN")?,
            elb_listener_arn: required("ELB_LISTENER_ARN")?,
            sqs_queue_url: required("SQS_QUEUE_URL")?,
            elb_shed_percent: int_in_range("ELB_SHED_PERCENT", 5, 0, 100)?,
            max_elb_shed_percent: int_in_range("MAX_ELB_SHED_PERCENT", 100, 0, 100)?,
            elb_restore_percent: int_in_range("ELB_RESTORE_PERCENT", 5, 0, 100)?,
            shed_mesg_delay_sec: int_in_range("SHED_MESG_DELAY_SEC", 60, 60, 300)?,
            restore_mesg_delay_sec: int_in_range("RESTORE_MESG_DELAY_SEC", 120, 60, 300)?,
        })
    }
}
