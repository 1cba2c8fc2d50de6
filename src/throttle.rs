//! Throttle registry (`spec.md` §3.4, §4.4). One [`ThrottleSpec`] per
//! external domain, swapped atomically as a whole unit on
//! `throttlingSpecification` commands (`spec.md` §4.7's "Atomicity: a
//! domain's throttle state is replaced wholesale, readers never observe a
//! half-applied spec" invariant). Grounded on the teacher's whole-value
//! `ArcSwapOption` config-hot-swap pattern; adapted here to a fixed array
//! of nine per-domain slots instead of one process-wide config cell.

use std::collections::HashSet;

use arc_swap::ArcSwapOption;

use crate::model::header::Domain;

/// A single domain's suppression rules, as received from a collector's
/// `throttlingSpecification` command (`spec.md` §4.7). `suppressed_fields`
/// names whole optional fields to drop; `suppressed_nv_pair_names` names
/// individual (list-name, key) pairs to drop from "additional info" /
/// "additional measurements" collections.
#[derive(Debug, Clone, Default)]
pub struct ThrottleSpec {
    pub suppressed_fields: HashSet<String>,
    pub suppressed_nv_pair_names: HashSet<(String, String)>,
}

impl ThrottleSpec {
    pub fn new() -> Self {
        ThrottleSpec::default()
    }

    pub fn suppress_field(&mut self, field_name: impl Into<String>) {
        self.suppressed_fields.insert(field_name.into());
    }

    pub fn suppress_nv_pair(&mut self, list_name: impl Into<String>, key: impl Into<String>) {
        self.suppressed_nv_pair_names
            .insert((list_name.into(), key.into()));
    }

    pub fn is_field_suppressed(&self, field_name: &str) -> bool {
        self.suppressed_fields.contains(field_name)
    }

    pub fn is_nv_pair_suppressed(&self, list_name: &str, key: &str) -> bool {
        self.suppressed_nv_pair_names
            .contains(&(list_name.to_string(), key.to_string()))
    }
}

/// Per-domain throttle state plus the process-wide measurement interval
/// the collector may override (`spec.md` §4.7's `measurementIntervalChange`
/// command). Every domain slot starts `None` (unthrottled); `apply` and
/// `clear` perform a single atomic pointer swap so a reader never sees a
/// half-applied spec even while a new one is being installed concurrently
/// from the handler thread.
pub struct ThrottleRegistry {
    slots: [ArcSwapOption<ThrottleSpec>; 9],
    measurement_interval_seconds: std::sync::atomic::AtomicI64,
}

impl ThrottleRegistry {
    pub fn new() -> Self {
        ThrottleRegistry {
            slots: Default::default(),
            measurement_interval_seconds: std::sync::atomic::AtomicI64::new(-1),
        }
    }

    fn slot_index(domain: Domain) -> Option<usize> {
        Domain::EXTERNAL_DOMAINS.iter().position(|d| *d == domain)
    }

    /// Installs `spec` as the domain's active throttle state, replacing
    /// whatever was there before in one atomic swap.
    pub fn apply(&self, domain: Domain, spec: ThrottleSpec) {
        if let Some(idx) = Self::slot_index(domain) {
            self.slots[idx].store(Some(std::sync::Arc::new(spec)));
        }
    }

    /// Removes the domain's throttle state entirely (collector command
    /// with an empty suppression list clears rather than installs a
    /// no-op spec, `spec.md` §4.7).
    pub fn clear(&self, domain: Domain) {
        if let Some(idx) = Self::slot_index(domain) {
            self.slots[idx].store(None);
        }
    }

    /// Returns the domain's current throttle spec, if any. The returned
    /// `Arc` is a stable snapshot: a concurrent `apply`/`clear` from
    /// another thread never mutates it out from under the caller.
    pub fn get(&self, domain: Domain) -> Option<std::sync::Arc<ThrottleSpec>> {
        Self::slot_index(domain).and_then(|idx| self.slots[idx].load_full())
    }

    /// Sets the collector-advertised measurement interval, or clears it
    /// (`None`) if the collector's `measurementIntervalChange` command
    /// requests the library default.
    pub fn set_measurement_interval(&self, seconds: Option<u32>) {
        self.measurement_interval_seconds.store(
            seconds.map(|s| s as i64).unwrap_or(-1),
            std::sync::atomic::Ordering::SeqCst,
        );
    }

    pub fn measurement_interval(&self) -> Option<u32> {
        let v = self
            .measurement_interval_seconds
            .load(std::sync::atomic::Ordering::SeqCst);
        if v < 0 {
            None
        } else {
            Some(v as u32)
        }
    }
}

impl Default for ThrottleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unthrottled_domain_returns_none() {
        let registry = ThrottleRegistry::new();
        assert!(registry.get(Domain::Fault).is_none());
    }

    #[test]
    fn apply_then_clear_round_trips() {
        let registry = ThrottleRegistry::new();
        let mut spec = ThrottleSpec::new();
        spec.suppress_field("alarmInterfaceA");
        registry.apply(Domain::Fault, spec);
        assert!(registry
            .get(Domain::Fault)
            .unwrap()
            .is_field_suppressed("alarmInterfaceA"));

        registry.clear(Domain::Fault);
        assert!(registry.get(Domain::Fault).is_none());
    }

    #[test]
    fn domains_are_independent() {
        let registry = ThrottleRegistry::new();
        let mut spec = ThrottleSpec::new();
        spec.suppress_field("x");
        registry.apply(Domain::Fault, spec);
        assert!(registry.get(Domain::Heartbeat).is_none());
    }

    #[test]
    fn measurement_interval_defaults_to_none() {
        let registry = ThrottleRegistry::new();
        assert_eq!(registry.measurement_interval(), None);
        registry.set_measurement_interval(Some(60));
        assert_eq!(registry.measurement_interval(), Some(60));
        registry.set_measurement_interval(None);
        assert_eq!(registry.measurement_interval(), None);
    }
}
