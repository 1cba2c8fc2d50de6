//! Fault domain (`spec.md` §3.3). Wire key: `faultFields`.

use crate::option::Field;

use super::NameValuePair;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Critical,
    Major,
    Minor,
    Warning,
    Normal,
}

impl Severity {
    pub fn wire_name(self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Major => "MAJOR",
            Severity::Minor => "MINOR",
            Severity::Warning => "WARNING",
            Severity::Normal => "NORMAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Vm,
    Router,
    Switch,
    Host,
    Card,
    Port,
    SlotThreshold,
    PortThreshold,
    Vnf,
}

impl SourceType {
    pub fn wire_name(self) -> &'static str {
        match self {
            SourceType::Vm => "virtualMachine",
            SourceType::Router => "router",
            SourceType::Switch => "switch",
            SourceType::Host => "host",
            SourceType::Card => "card",
            SourceType::Port => "port",
            SourceType::SlotThreshold => "slotThreshold",
            SourceType::PortThreshold => "portThreshold",
            SourceType::Vnf => "virtualNetworkFunction",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VfStatus {
    Active,
    Idle,
    PrepTerminate,
    ReadyTerminate,
    ReqTerminate,
}

impl VfStatus {
    pub fn wire_name(self) -> &'static str {
        match self {
            VfStatus::Active => "Active",
            VfStatus::Idle => "Idle",
            VfStatus::PrepTerminate => "Preparing to terminate",
            VfStatus::ReadyTerminate => "Ready to terminate",
            VfStatus::ReqTerminate => "Requesting termination",
        }
    }
}

/// `faultFields` payload (`spec.md` §3.3). Mandatory fields are taken by
/// value in [`FaultFields::new`] and are immutable afterward; optionals use
/// [`Field`]'s set-once discipline.
#[derive(Debug, Clone)]
pub struct FaultFields {
    pub alarm_condition: String,
    pub specific_problem: String,
    pub event_severity: Severity,
    pub event_source_type: SourceType,
    pub vf_status: VfStatus,
    pub alarm_category: Field<String>,
    pub alarm_interface_a: Field<String>,
    pub event_category: Field<String>,
    pub event_type: Field<String>,
    pub additional_info: Vec<NameValuePair>,
}

impl FaultFields {
    pub fn new(
        alarm_condition: impl Into<String>,
        specific_problem: impl Into<String>,
        event_severity: Severity,
        event_source_type: SourceType,
        vf_status: VfStatus,
    ) -> Self {
        FaultFields {
            alarm_condition: alarm_condition.into(),
            specific_problem: specific_problem.into(),
            event_severity,
            event_source_type,
            vf_status,
            alarm_category: Field::unset(),
            alarm_interface_a: Field::unset(),
            event_category: Field::unset(),
            event_type: Field::unset(),
            additional_info: Vec::new(),
        }
    }

    pub fn set_alarm_interface_a(&mut self, value: impl Into<String>) {
        self.alarm_interface_a.set(value.into(), "alarmInterfaceA");
    }

    pub fn set_event_type(&mut self, value: impl Into<String>) {
        self.event_type.set(value.into(), "eventType");
    }

    pub fn add_additional_info(&mut self, name: impl Into<String>, value: impl Into<String>) {
        super::push_info(&mut self.additional_info, name, value);
    }
}
