//! Batch domain (`spec.md` §3.3, §4.2): "an ordered list of other events;
//! encoded as an array of envelopes rather than a single envelope". Unlike
//! every other domain, a batch has no `domain` wire value or `<domain>Fields`
//! key of its own — it wraps complete events.

use crate::model::event::Event;

/// An ordered list of complete events, encoded as `{"eventList": [...]}`
/// rather than the usual single-envelope `{"event": {...}}` shape
/// (`spec.md` §4.2). Order is preserved; a batch is never itself nested
/// inside another batch.
#[derive(Debug, Clone, Default)]
pub struct BatchFields {
    pub events: Vec<Event>,
}

impl BatchFields {
    pub fn new() -> Self {
        BatchFields::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }
}
