//! Injectable wall-clock, so event timestamps are deterministic in tests.
//!
//! Grounded on the teacher's `time::clock::Clock` abstraction (real time in
//! production, a controllable stand-in under test) — trimmed down to just
//! "epoch microseconds", since the event model has no use for monotonic
//! `Instant`s or sleep futures.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of "now", expressed as microseconds since the Unix epoch — the
/// unit `start_epoch_microsec`/`last_epoch_microsec` are specified in
/// (`spec.md` §3.1).
pub trait Clock: Send + Sync + 'static {
    fn now_micros(&self) -> u64;
}

/// Real wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_micros(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_micros() as u64
    }
}

/// A clock that returns a fixed value until explicitly advanced. Used by
/// the scenario tests in `spec.md` §8 (S1 pins `lastEpochMicrosec` to a
/// literal value).
#[derive(Debug)]
pub struct FixedClock {
    micros: AtomicU64,
}

impl FixedClock {
    pub fn new(micros: u64) -> Self {
        FixedClock {
            micros: AtomicU64::new(micros),
        }
    }

    pub fn set(&self, micros: u64) {
        self.micros.store(micros, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_micros(&self) -> u64 {
        self.micros.load(Ordering::SeqCst)
    }
}
