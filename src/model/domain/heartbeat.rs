//! Heartbeat domain (`spec.md` §3.3). Wire key: `heartbeatFields`. Carries
//! no mandatory fields beyond the common header; `heartbeat_interval` is
//! the only domain-specific attribute, mirroring
//! `evel_heartbeat.c`'s minimal field set.

use crate::option::Field;

#[derive(Debug, Clone, Default)]
pub struct HeartbeatFields {
    pub heartbeat_interval: Field<i64>,
    pub heartbeat_field_version: Field<String>,
}

impl HeartbeatFields {
    pub fn new() -> Self {
        HeartbeatFields::default()
    }

    pub fn set_heartbeat_interval(&mut self, seconds: i64) {
        self.heartbeat_interval.set(seconds, "heartbeatInterval");
    }
}
