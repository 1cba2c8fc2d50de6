//! Bounded MPMC event queue (`spec.md` §3.2, §4.5). `Mutex` + `Condvar`
//! rather than a lock-free ring: producers never block (a full queue is a
//! `QueueFull` error, §7), only the single consumer thread blocks waiting
//! for work, so there's no latency-sensitive fast path that would justify
//! lock-free machinery. Grounded on the teacher's bounded-queue
//! concurrency-primitive tests (`tests/concurrency_primitives.rs`), adapted
//! from a generic work queue to this crate's non-blocking-write/
//! blocking-read contract.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use crate::error::{Result, VelError};
use crate::model::event::Event;

struct State {
    items: VecDeque<Event>,
    capacity: usize,
}

/// A fixed-capacity FIFO queue shared between producer threads (callers of
/// [`crate::client::VelClient::post_event`]) and the single consumer
/// thread (`spec.md` §4.6). Ordering guarantee (§5): events from the same
/// producer thread are dequeued in the order they were written.
pub struct RingBuffer {
    state: Mutex<State>,
    not_empty: Condvar,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        RingBuffer {
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity),
                capacity,
            }),
            not_empty: Condvar::new(),
        }
    }

    /// Non-blocking write (`spec.md` §4.5: "a full queue rejects
    /// immediately rather than blocking the producer"). Returns
    /// [`VelError::QueueFull`] if the queue is at capacity.
    pub fn write(&self, event: Event) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.items.len() >= state.capacity {
            return Err(VelError::QueueFull);
        }
        state.items.push_back(event);
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Blocks until an item is available, then removes and returns it.
    pub fn read(&self) -> Event {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if let Some(event) = state.items.pop_front() {
                return event;
            }
            state = self
                .not_empty
                .wait(state)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Blocks up to `timeout` for an item; returns `None` on timeout.
    /// Used by the handler thread's shutdown path to avoid blocking
    /// forever if a sentinel is somehow lost.
    pub fn read_timeout(&self, timeout: Duration) -> Option<Event> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if let Some(event) = state.items.pop_front() {
                return Some(event);
            }
            let (guard, result) = self
                .not_empty
                .wait_timeout(state, timeout)
                .unwrap_or_else(|e| e.into_inner());
            state = guard;
            if result.timed_out() {
                return state.items.pop_front();
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .items
            .is_empty()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::event::InternalCommand;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn write_rejects_when_full() {
        let queue = RingBuffer::new(1);
        queue.write(Event::Internal(InternalCommand::Terminate)).unwrap();
        let err = queue.write(Event::Internal(InternalCommand::Terminate));
        assert!(matches!(err, Err(VelError::QueueFull)));
    }

    #[test]
    fn fifo_order_is_preserved() {
        let queue = RingBuffer::new(4);
        for _ in 0..3 {
            queue.write(Event::Internal(InternalCommand::Terminate)).unwrap();
        }
        assert_eq!(queue.len(), 3);
        queue.read();
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn blocking_read_wakes_on_write() {
        let queue = Arc::new(RingBuffer::new(4));
        let reader = Arc::clone(&queue);
        let handle = thread::spawn(move || {
            reader.read();
        });
        thread::sleep(Duration::from_millis(20));
        queue.write(Event::Internal(InternalCommand::Terminate)).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn read_timeout_returns_none_when_empty() {
        let queue = RingBuffer::new(4);
        assert!(queue.read_timeout(Duration::from_millis(10)).is_none());
    }
}

/// `loom`-scheduled interleaving check for the two-producer case. Only
/// covers scheduling of the public `write`/`read` API, not the `Mutex`
/// internals (those stay `std::sync`, not `loom::sync`, since the queue
/// is a thin wrapper rather than a hand-rolled lock-free structure) — the
/// property under test is "capacity is never exceeded no matter how the
/// two producers interleave", not lock-internals linearizability.
#[cfg(all(test, feature = "loom-checks"))]
mod loom_tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn concurrent_producers_never_exceed_capacity() {
        loom::model(|| {
            let queue = Arc::new(RingBuffer::new(2));
            let q1 = Arc::clone(&queue);
            let q2 = Arc::clone(&queue);
            let t1 = loom::thread::spawn(move || {
                let _ = q1.write(Event::Internal(InternalCommand::Terminate));
            });
            let t2 = loom::thread::spawn(move || {
                let _ = q2.write(Event::Internal(InternalCommand::Terminate));
            });
            t1.join().unwrap();
            t2.join().unwrap();
            assert!(queue.len() <= 2);
        });
    }
}
