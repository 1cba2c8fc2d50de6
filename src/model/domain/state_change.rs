//! State-change domain (`spec.md` §3.3). Wire key: `stateChangeFields`.

use super::NameValuePair;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    InService,
    OutOfService,
    Maintenance,
}

impl EntityState {
    pub fn wire_name(self) -> &'static str {
        match self {
            EntityState::InService => "inService",
            EntityState::OutOfService => "outOfService",
            EntityState::Maintenance => "maintenance",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StateChangeFields {
    pub new_state: EntityState,
    pub old_state: EntityState,
    pub state_interface: String,
    pub additional_fields: Vec<NameValuePair>,
}

impl StateChangeFields {
    pub fn new(
        new_state: EntityState,
        old_state: EntityState,
        state_interface: impl Into<String>,
    ) -> Self {
        StateChangeFields {
            new_state,
            old_state,
            state_interface: state_interface.into(),
            additional_fields: Vec::new(),
        }
    }

    pub fn add_additional_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        super::push_info(&mut self.additional_fields, name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_collector_schema() {
        assert_eq!(EntityState::InService.wire_name(), "inService");
        assert_eq!(EntityState::OutOfService.wire_name(), "outOfService");
        assert_eq!(EntityState::Maintenance.wire_name(), "maintenance");
    }
}
