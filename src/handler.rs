//! Single consumer thread (C6, `spec.md` §4.6). Owns the only lifecycle
//! that matters from the wire's point of view: pull one [`Event`] off the
//! [`RingBuffer`], encode it, POST it, hand the reply to the response
//! parser, and on an internal `Terminate` sentinel drain whatever remains
//! and exit. Grounded on the teacher's single-threaded "pump a channel
//! until told to stop" worker pattern, adapted to the ordered-shutdown
//! contract `spec.md` §5 and §8 scenario S6 require.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::model::event::{Event, InternalCommand};
use crate::ring_buffer::RingBuffer;
use crate::response;
use crate::throttle::ThrottleRegistry;
use crate::transport::{BasicAuth, Transport};
use crate::wire;

/// How long the handler waits for a sentinel during drain before giving up
/// and exiting anyway (`spec.md` §5 ordering guarantee 2: "termination
/// drains the queue, it never abandons already-queued events"). This is a
/// belt-and-suspenders timeout, not a normal code path: `terminate` always
/// posts exactly one `Terminate` sentinel after every producer has stopped
/// calling `post_event`.
const DRAIN_IDLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything the handler thread needs that doesn't change for its whole
/// lifetime: where to post events and (optionally) throttle-state replies,
/// and how to authenticate.
pub struct HandlerConfig {
    pub event_url: String,
    pub throttle_state_url: String,
    pub auth: Option<BasicAuth>,
}

/// Owns the background thread and the flag producers consult to reject
/// `post_event` calls once shutdown has been requested (`spec.md` §4.6
/// state machine: `active -> request_terminate -> terminating ->
/// terminated`).
pub struct EventHandler {
    queue: Arc<RingBuffer>,
    terminate_requested: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<()>>,
}

impl EventHandler {
    /// Spawns the consumer thread and returns immediately. `registry` is
    /// shared with whatever installs `throttlingSpecification` commands
    /// (the handler itself, via the response it receives on each POST).
    pub fn spawn(
        queue: Arc<RingBuffer>,
        registry: Arc<ThrottleRegistry>,
        transport: Arc<dyn Transport>,
        config: HandlerConfig,
    ) -> Self {
        let terminate_requested = Arc::new(AtomicBool::new(false));
        let thread_queue = Arc::clone(&queue);
        let join_handle = std::thread::Builder::new()
            .name("vel-client-handler".into())
            .spawn(move || run(thread_queue, registry, transport, config))
            .expect("failed to spawn vel-client handler thread");

        EventHandler {
            queue,
            terminate_requested,
            join_handle: Some(join_handle),
        }
    }

    /// Whether `terminate` has already been called. Producers consult this
    /// to reject `post_event` after shutdown has begun (`spec.md` §7:
    /// "post after terminate has been requested" is a lifecycle-misuse
    /// error).
    pub fn is_terminating(&self) -> bool {
        self.terminate_requested.load(Ordering::SeqCst)
    }

    /// Requests an orderly shutdown: posts the `Terminate` sentinel and
    /// blocks until the consumer thread has drained the queue and exited
    /// (`spec.md` §4.6, §5 ordering guarantee 2, scenario S6). Idempotent:
    /// a second call is a no-op beyond joining again, which is harmless
    /// since `join` on an already-joined handle simply isn't attempted
    /// twice (`join_handle` is consumed on first call).
    pub fn terminate(&mut self) {
        if self.terminate_requested.swap(true, Ordering::SeqCst) {
            return;
        }
        // A full queue during shutdown still must not lose the sentinel:
        // retry the write until the consumer thread, which is draining
        // concurrently, makes room.
        while self.queue.write(Event::Internal(InternalCommand::Terminate)).is_err() {
            std::thread::yield_now();
        }
        if let Some(handle) = self.join_handle.take() {
            if handle.join().is_err() {
                tracing::error!("vel-client handler thread panicked during shutdown");
            }
        }
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.terminate();
    }
}

fn run(
    queue: Arc<RingBuffer>,
    registry: Arc<ThrottleRegistry>,
    transport: Arc<dyn Transport>,
    config: HandlerConfig,
) {
    tracing::info!("vel-client handler thread started");
    loop {
        let event = queue.read();
        if event.is_internal() {
            drain_remaining(&queue, &registry, transport.as_ref(), &config);
            break;
        }
        dispatch_one(event, &registry, transport.as_ref(), &config);
    }
    tracing::info!("vel-client handler thread exiting");
}

/// Once the `Terminate` sentinel is seen, every event already queued ahead
/// of it has already been consumed by the normal loop (FIFO order, §5
/// guarantee 1) — what's left to drain is anything still behind the
/// sentinel in the unlikely case a producer raced the shutdown flag. Reads
/// with a timeout rather than forever, so a lost wakeup can't hang
/// shutdown indefinitely.
fn drain_remaining(
    queue: &RingBuffer,
    registry: &ThrottleRegistry,
    transport: &dyn Transport,
    config: &HandlerConfig,
) {
    while let Some(event) = queue.read_timeout(DRAIN_IDLE_TIMEOUT) {
        if event.is_internal() {
            continue;
        }
        dispatch_one(event, registry, transport, config);
    }
}

/// Encodes, POSTs, and feeds the reply back through the response parser
/// for one event. Every failure stage is logged and swallowed (`spec.md`
/// §7): a bad encode or a transport failure drops this one event without
/// affecting the next iteration of the loop.
fn dispatch_one(
    event: Event,
    registry: &ThrottleRegistry,
    transport: &dyn Transport,
    config: &HandlerConfig,
) {
    let body = match wire::encode_event(&event, registry) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = ?e, "failed to encode event, dropping");
            return;
        }
    };

    let response_body = match transport.post_json(&config.event_url, body, config.auth.as_ref()) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = ?e, "transport POST failed, event dropped");
            return;
        }
    };

    if let Some(state_reply) = response::handle_response(&response_body, registry) {
        if let Err(e) = transport.post_json(&config.throttle_state_url, state_reply, config.auth.as_ref())
        {
            tracing::error!(error = ?e, "failed to post throttling-state reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::domain::heartbeat::HeartbeatFields;
    use crate::model::header::{Domain, EventContext, Priority, SchemaVersion};
    use crate::platform::PlatformMetadata;
    use crate::transport::test_support::MockTransport;

    fn ctx() -> EventContext {
        EventContext::new(PlatformMetadata {
            reporting_entity_name: "vm-name".into(),
            reporting_entity_id: None,
            source_name: "vm-name".into(),
            source_id: None,
            functional_role: "unit-test".into(),
        })
    }

    fn config() -> HandlerConfig {
        HandlerConfig {
            event_url: "http://collector/eventListener/v7".into(),
            throttle_state_url: "http://collector/eventListener/v7/clientThrottlingState".into(),
            auth: None,
        }
    }

    /// Scenario S6 (`spec.md` §8): events posted before `terminate` are all
    /// delivered before the thread exits.
    #[test]
    fn terminate_drains_queued_events_before_exiting() {
        let queue = Arc::new(RingBuffer::new(16));
        let registry = Arc::new(ThrottleRegistry::new());
        let transport = Arc::new(MockTransport::new());
        let ctx = ctx();

        for _ in 0..5 {
            let header = ctx.new_header(Domain::Heartbeat, "hb", Priority::Normal, SchemaVersion::new(1, None));
            queue
                .write(Event::Heartbeat(header, HeartbeatFields::new()))
                .unwrap();
        }

        let mut handler = EventHandler::spawn(
            Arc::clone(&queue),
            registry,
            Arc::clone(&transport) as Arc<dyn Transport>,
            config(),
        );
        handler.terminate();

        assert_eq!(transport.post_count(), 5);
        assert!(queue.is_empty());
    }

    #[test]
    fn post_after_terminate_requested_is_observable_by_producers() {
        let queue = Arc::new(RingBuffer::new(4));
        let registry = Arc::new(ThrottleRegistry::new());
        let transport = Arc::new(MockTransport::new());

        let mut handler = EventHandler::spawn(
            Arc::clone(&queue),
            registry,
            Arc::clone(&transport) as Arc<dyn Transport>,
            config(),
        );
        assert!(!handler.is_terminating());
        handler.terminate();
        assert!(handler.is_terminating());
    }

    /// A throttling-state reply requested by the collector is posted back
    /// to the throttle-state URL on the same dispatch.
    #[test]
    fn provide_throttling_state_reply_is_posted_back() {
        let queue = Arc::new(RingBuffer::new(4));
        let registry = Arc::new(ThrottleRegistry::new());
        let transport = Arc::new(MockTransport::new());
        transport.push_response(br#"{"commandList":[{"command":{"commandType":"provideThrottlingState"}}]}"#.to_vec());

        let ctx = ctx();
        let header = ctx.new_header(Domain::Heartbeat, "hb", Priority::Normal, SchemaVersion::new(1, None));
        queue.write(Event::Heartbeat(header, HeartbeatFields::new())).unwrap();

        let mut handler = EventHandler::spawn(
            Arc::clone(&queue),
            registry,
            Arc::clone(&transport) as Arc<dyn Transport>,
            config(),
        );
        handler.terminate();

        let posts = transport.posts();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[1].url, "http://collector/eventListener/v7/clientThrottlingState");
    }
}
