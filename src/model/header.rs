//! Shared event header (`spec.md` §3.1) and the process-wide context that
//! stamps every event with a sequence number, timestamps, and platform
//! defaults at construction time.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::option::Field;
use crate::platform::PlatformMetadata;

/// Event domain, selecting payload schema and throttle scope (`spec.md`
/// §3.1, §6.1). `Internal` and `Batch` are process-local: `Internal` never
/// reaches the wire (it's the shutdown sentinel), and `Batch` is encoded as
/// an array of the wrapped domains' envelopes rather than carrying its own
/// `domain` wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Heartbeat,
    Fault,
    Measurement,
    MobileFlow,
    Report,
    Service,
    Signaling,
    StateChange,
    Syslog,
    Other,
    Internal,
    Batch,
}

impl Domain {
    /// External domains are the nine that participate in throttling and
    /// have a collector-facing schema (`spec.md` §3.4: "For each of the
    /// nine external domains..."). `Internal` and `Batch` are excluded.
    pub fn is_external(self) -> bool {
        !matches!(self, Domain::Internal | Domain::Batch)
    }

    /// All nine throttle-eligible domains, in a stable order used to index
    /// the throttle registry and to enumerate "provide throttling state"
    /// replies deterministically.
    pub const EXTERNAL_DOMAINS: [Domain; 9] = [
        Domain::Heartbeat,
        Domain::Fault,
        Domain::Measurement,
        Domain::MobileFlow,
        Domain::Report,
        Domain::Service,
        Domain::Signaling,
        Domain::StateChange,
        Domain::Syslog,
    ];

    /// Wire value of the `domain` header field (`spec.md` §6.1). `Other`'s
    /// wire name is `"other"`; `Internal`/`Batch` never reach the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            Domain::Heartbeat => "heartbeat",
            Domain::Fault => "fault",
            Domain::Measurement => "measurementsForVfScaling",
            Domain::MobileFlow => "mobileFlow",
            Domain::Report => "measurementsForVfReporting",
            Domain::Service => "serviceEvents",
            Domain::Signaling => "signaling",
            Domain::StateChange => "stateChange",
            Domain::Syslog => "syslog",
            Domain::Other => "other",
            Domain::Internal => "internal",
            Domain::Batch => "batch",
        }
    }

    /// Wire name of the `<domain>Fields` payload key (`spec.md` §6.1),
    /// which diverges from `wire_name()` for the measurement, report, and
    /// service domains per the collector schema.
    pub fn fields_key(self) -> &'static str {
        match self {
            Domain::Heartbeat => "heartbeatFields",
            Domain::Fault => "faultFields",
            Domain::Measurement => "measurementsForVfScalingFields",
            Domain::MobileFlow => "mobileFlowFields",
            Domain::Report => "reportFields",
            Domain::Service => "serviceEventsFields",
            Domain::Signaling => "signalingFields",
            Domain::StateChange => "stateChangeFields",
            Domain::Syslog => "syslogFields",
            Domain::Other => "otherFields",
            Domain::Internal | Domain::Batch => "",
        }
    }

    /// Throttle-registry identifier used in collector commands (the
    /// `"eventDomain"` string in `throttlingSpecification` commands,
    /// `spec.md` §4.7). Equal to [`Self::wire_name`] for every external
    /// domain today; kept as its own method since throttle commands and
    /// the header's `domain` field are conceptually separate wire
    /// contracts that happen to share values.
    pub fn throttle_name(self) -> &'static str {
        match self {
            Domain::Measurement => "measurementsForVfScaling",
            other => other.wire_name(),
        }
    }

    pub fn from_throttle_name(name: &str) -> Option<Domain> {
        Domain::EXTERNAL_DOMAINS
            .into_iter()
            .find(|d| d.throttle_name() == name)
    }
}

/// Event priority (`spec.md` §3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
    Normal,
    Low,
}

impl Priority {
    pub fn wire_name(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Normal => "Normal",
            Priority::Low => "Low",
        }
    }
}

/// Schema version stamped on every header (`spec.md` §3.1: "schema
/// major/minor version"). The collector schema in scope is v1, domain
/// payload versions vary (`spec.md` §6.1 per-domain "version numbers are
/// fixed by the collector schema").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: Option<u32>,
}

impl SchemaVersion {
    pub const fn new(major: u32, minor: Option<u32>) -> Self {
        SchemaVersion { major, minor }
    }
}

/// Process-wide state shared by every event factory: the monotonic
/// sequence counter and the platform metadata defaults used to populate
/// `reporting_entity_name`/`id`, `source_name`/`id` when the caller doesn't
/// override them (`spec.md` §3.1 "Defaults for names/ids come from platform
/// metadata at init", §9 "model them as an explicit context object passed
/// to factories rather than globals").
#[derive(Clone)]
pub struct EventContext {
    sequence: Arc<AtomicU64>,
    next_sequence_override: Arc<AtomicI64>,
    metadata: Arc<PlatformMetadata>,
    clock: Arc<dyn Clock>,
}

impl EventContext {
    pub fn new(metadata: PlatformMetadata) -> Self {
        Self::with_clock(metadata, Arc::new(SystemClock))
    }

    pub fn with_clock(metadata: PlatformMetadata, clock: Arc<dyn Clock>) -> Self {
        EventContext {
            sequence: Arc::new(AtomicU64::new(1)),
            next_sequence_override: Arc::new(AtomicI64::new(-1)),
            metadata: Arc::new(metadata),
            clock,
        }
    }

    /// Test/demo hook: force the next sequence number (used by scenario S1,
    /// `spec.md` §8, which calls `set_next_sequence(121)`).
    pub fn set_next_sequence(&self, next: u64) {
        self.next_sequence_override
            .store(next as i64, Ordering::SeqCst);
    }

    /// Returns the next sequence number and advances the counter.
    /// Sequence numbers strictly increase within a process (§3.1
    /// invariant); the single shared atomic counter is the only source of
    /// truth, per §5's ordering guarantees.
    fn next_sequence(&self) -> u64 {
        let overridden = self.next_sequence_override.swap(-1, Ordering::SeqCst);
        if overridden >= 0 {
            self.sequence.store(overridden as u64 + 1, Ordering::SeqCst);
            return overridden as u64;
        }
        self.sequence.fetch_add(1, Ordering::SeqCst)
    }

    pub fn metadata(&self) -> &PlatformMetadata {
        &self.metadata
    }

    fn now_micros(&self) -> u64 {
        self.clock.now_micros()
    }

    /// Builds a fresh header for a newly-constructed event: next sequence
    /// number, `start`/`last` epoch both stamped to "now" (§3.1 invariant
    /// `start_epoch_microsec <= last_epoch_microsec` holds trivially at
    /// construction since both are the same timestamp), and name/id
    /// defaults copied from platform metadata.
    pub fn new_header(
        &self,
        domain: Domain,
        event_name: impl Into<String>,
        priority: Priority,
        version: SchemaVersion,
    ) -> CommonEventHeader {
        let now = self.now_micros();
        let sequence = self.next_sequence();
        CommonEventHeader {
            domain,
            sequence,
            event_id: sequence.to_string(),
            event_name: event_name.into(),
            functional_role: self.metadata.functional_role.clone(),
            priority,
            start_epoch_microsec: now,
            last_epoch_microsec: now,
            reporting_entity_name: self.metadata.reporting_entity_name.clone(),
            reporting_entity_id: Field::from(self.metadata.reporting_entity_id.clone()),
            source_id: Field::from(self.metadata.source_id.clone()),
            source_name: self.metadata.source_name.clone(),
            event_type: Field::unset(),
            version,
        }
    }
}

/// The `commonEventHeader` object (`spec.md` §3.1, §6.1 wire key order).
#[derive(Debug, Clone)]
pub struct CommonEventHeader {
    pub domain: Domain,
    pub sequence: u64,
    pub event_id: String,
    pub event_name: String,
    pub functional_role: String,
    pub priority: Priority,
    pub start_epoch_microsec: u64,
    pub last_epoch_microsec: u64,
    pub reporting_entity_name: String,
    pub reporting_entity_id: Field<String>,
    pub source_id: Field<String>,
    pub source_name: String,
    pub event_type: Field<String>,
    pub version: SchemaVersion,
}

impl CommonEventHeader {
    /// Update `last_epoch_microsec` to a caller-supplied "now". Producers
    /// call this as an event accrues additional measurements over its
    /// lifetime; the invariant `start <= last` must be preserved by callers
    /// (§3.1).
    pub fn touch_last_epoch(&mut self, now_micros: u64) {
        self.last_epoch_microsec = now_micros;
    }

    /// Set-once override of `event_id` (defaults to the sequence number as
    /// a string, §3.1).
    pub fn set_event_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        if self.event_id != self.sequence.to_string() {
            tracing::warn!("ignoring duplicate set on already-set option field: event_id");
            return;
        }
        self.event_id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PlatformMetadata;

    fn ctx() -> EventContext {
        EventContext::new(PlatformMetadata {
            reporting_entity_name: "vm-name".into(),
            reporting_entity_id: Some("vm-uuid".into()),
            source_name: "vm-name".into(),
            source_id: Some("vm-uuid".into()),
            functional_role: "UNIT TEST".into(),
        })
    }

    /// Property 1 (spec.md §8): sequence numbers strictly increase.
    #[test]
    fn sequence_strictly_increases() {
        let ctx = ctx();
        let a = ctx.new_header(Domain::Heartbeat, "h", Priority::Normal, SchemaVersion::new(1, Some(2)));
        let b = ctx.new_header(Domain::Heartbeat, "h", Priority::Normal, SchemaVersion::new(1, Some(2)));
        assert!(b.sequence > a.sequence);
    }

    #[test]
    fn set_next_sequence_overrides_once() {
        let ctx = ctx();
        ctx.set_next_sequence(121);
        let h = ctx.new_header(Domain::Heartbeat, "h", Priority::Normal, SchemaVersion::new(1, Some(2)));
        assert_eq!(h.sequence, 121);
        let h2 = ctx.new_header(Domain::Heartbeat, "h", Priority::Normal, SchemaVersion::new(1, Some(2)));
        assert_eq!(h2.sequence, 122);
    }

    #[test]
    fn start_never_exceeds_last() {
        let ctx = ctx();
        let h = ctx.new_header(Domain::Heartbeat, "h", Priority::Normal, SchemaVersion::new(1, Some(2)));
        assert!(h.start_epoch_microsec <= h.last_epoch_microsec);
    }
}
