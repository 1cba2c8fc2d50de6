//! The `Event` enum and its tagged dispatch (`spec.md` §9 design note:
//! "Preferred: a domain tag and match-on-tag dispatch, to keep event
//! objects plain data" — chosen over a trait-object-per-domain design so
//! [`crate::encoder`] can exhaustively match without downcasting).

use super::domain::batch::BatchFields;
use super::domain::fault::FaultFields;
use super::domain::heartbeat::HeartbeatFields;
use super::domain::measurement::MeasurementFields;
use super::domain::mobile_flow::MobileFlowFields;
use super::domain::other::OtherFields;
use super::domain::report::ReportFields;
use super::domain::service::ServiceFields;
use super::domain::signaling::SignalingFields;
use super::domain::state_change::StateChangeFields;
use super::domain::syslog::SyslogFields;
use super::header::CommonEventHeader;

/// An internal command carried by the `Internal` domain (`spec.md` §3.3:
/// "carries a command variant (terminate); never emitted on the wire").
/// Posted onto the ring buffer to unwind the consumer thread cleanly
/// (`spec.md` §4.6, §5 ordering guarantee 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalCommand {
    Terminate,
}

/// One queued unit of work: either a real event bound for the collector,
/// or an internal sentinel consumed only by the handler thread itself.
#[derive(Debug, Clone)]
pub enum Event {
    Heartbeat(CommonEventHeader, HeartbeatFields),
    Fault(CommonEventHeader, FaultFields),
    Measurement(CommonEventHeader, MeasurementFields),
    MobileFlow(CommonEventHeader, MobileFlowFields),
    Report(CommonEventHeader, ReportFields),
    Service(CommonEventHeader, ServiceFields),
    Signaling(CommonEventHeader, SignalingFields),
    StateChange(CommonEventHeader, StateChangeFields),
    Syslog(CommonEventHeader, SyslogFields),
    Other(CommonEventHeader, OtherFields),
    Batch(CommonEventHeader, BatchFields),
    Internal(InternalCommand),
}

impl Event {
    /// The event's header, if it has one. `Internal` events carry no
    /// header — they never reach the wire.
    pub fn header(&self) -> Option<&CommonEventHeader> {
        match self {
            Event::Heartbeat(h, _)
            | Event::Fault(h, _)
            | Event::Measurement(h, _)
            | Event::MobileFlow(h, _)
            | Event::Report(h, _)
            | Event::Service(h, _)
            | Event::Signaling(h, _)
            | Event::StateChange(h, _)
            | Event::Syslog(h, _)
            | Event::Other(h, _)
            | Event::Batch(h, _) => Some(h),
            Event::Internal(_) => None,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Event::Internal(_))
    }
}
