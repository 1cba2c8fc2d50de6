//! Library entry point (C9, `spec.md` §4.8). `VelClient::initialize`
//! builds the event/throttling-state URLs, starts the logger's usual
//! `tracing` spans, queries platform metadata (non-fatal on failure), and
//! spawns the single consumer thread; `terminate` reverses all of it in
//! order. Grounded on the teacher's `initialize`/`terminate` pair at the
//! top of its own lifecycle module, generalized from that crate's
//! connection-pool setup to this crate's ring-buffer-plus-handler-thread
//! setup.

use std::sync::Arc;

use crate::config::VelConfig;
use crate::error::{Result, VelError};
use crate::handler::{EventHandler, HandlerConfig};
use crate::model::event::Event;
use crate::model::header::EventContext;
use crate::platform::{PlatformMetadata, PlatformMetadataProvider, StaticPlatformMetadata};
use crate::ring_buffer::RingBuffer;
use crate::throttle::ThrottleRegistry;
use crate::transport::{BasicAuth, Transport};

#[cfg(feature = "reqwest-transport")]
use crate::transport::ReqwestTransport;

/// The library's single public handle. Producers clone `event_context()`'s
/// owning `VelClient` (it's `Clone` via internal `Arc`s) or share a
/// reference across threads; only one `terminate` call does real work
/// (`spec.md` §4.6 lifecycle state machine).
pub struct VelClient {
    context: EventContext,
    queue: Arc<RingBuffer>,
    registry: Arc<ThrottleRegistry>,
    handler: EventHandler,
}

impl VelClient {
    /// Builds URLs from `config`, initializes the throttle registry and
    /// ring buffer, discovers platform metadata through `metadata_provider`
    /// (a failure here is logged and falls back to `config`'s source/role
    /// strings rather than aborting initialization, `spec.md` §4.8), and
    /// starts the consumer thread against `transport`.
    pub fn initialize(
        config: VelConfig,
        metadata_provider: &dyn PlatformMetadataProvider,
        transport: Arc<dyn Transport>,
    ) -> Result<VelClient> {
        let event_url = config.event_url();
        let throttle_state_url = config.throttle_state_url();

        let metadata = match metadata_provider.discover() {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::error!(error = ?e, "platform metadata discovery failed, using config fallback");
                fallback_metadata(&config)
            }
        };

        let context = EventContext::new(metadata);
        let queue = Arc::new(RingBuffer::new(config.ring_buffer_capacity));
        let registry = Arc::new(ThrottleRegistry::new());

        let auth = match (&config.username, &config.password) {
            (Some(username), Some(password)) => Some(BasicAuth {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        };

        let handler = EventHandler::spawn(
            Arc::clone(&queue),
            Arc::clone(&registry),
            transport,
            HandlerConfig {
                event_url,
                throttle_state_url,
                auth,
            },
        );

        tracing::info!("vel-client initialized");
        Ok(VelClient {
            context,
            queue,
            registry,
            handler,
        })
    }

    /// Builds a `VelClient` against the production `reqwest`-backed
    /// transport, for callers that don't need to supply their own.
    #[cfg(feature = "reqwest-transport")]
    pub fn initialize_with_reqwest(
        config: VelConfig,
        metadata_provider: &dyn PlatformMetadataProvider,
    ) -> Result<VelClient> {
        let transport = Arc::new(ReqwestTransport::new(config.verbosity)?);
        Self::initialize(config, metadata_provider, transport)
    }

    /// The header/sequence/metadata factory context shared by every
    /// per-domain event constructor (`spec.md` §3.1, §9's "explicit
    /// context object passed to factories"). Callers build a
    /// `CommonEventHeader` via `event_context().new_header(...)` and pair
    /// it with a domain fields struct before calling `post_event`.
    pub fn event_context(&self) -> &EventContext {
        &self.context
    }

    /// Enqueues `event` for the consumer thread (`spec.md` §4.5, §4.6).
    /// Non-blocking: returns `VelError::QueueFull` immediately if the ring
    /// buffer is at capacity, and `VelError::LifecycleMisuse` if shutdown
    /// has already been requested.
    pub fn post_event(&self, event: Event) -> Result<()> {
        if self.handler.is_terminating() {
            return Err(VelError::LifecycleMisuse(
                "post_event called after terminate was requested",
            ));
        }
        self.queue.write(event)
    }

    /// The collector-advertised measurement reporting interval, if one has
    /// been set via a `measurementIntervalChange` command (`spec.md`
    /// §4.7).
    pub fn measurement_interval(&self) -> Option<u32> {
        self.registry.measurement_interval()
    }

    /// Reverses `initialize`: posts the shutdown sentinel, blocks until
    /// the consumer thread has drained the queue and exited, then tears
    /// down the throttle registry (`spec.md` §4.8, §5 ordering guarantee
    /// 2, scenario S6).
    pub fn terminate(&mut self) {
        self.handler.terminate();
        tracing::info!("vel-client terminated");
    }
}

fn fallback_metadata(config: &VelConfig) -> PlatformMetadata {
    StaticPlatformMetadata(PlatformMetadata {
        reporting_entity_name: config.source_type.clone(),
        reporting_entity_id: None,
        source_name: config.source_type.clone(),
        source_id: None,
        functional_role: config.role.clone(),
    })
    .0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::domain::heartbeat::HeartbeatFields;
    use crate::model::header::{Domain, Priority, SchemaVersion};
    use crate::transport::test_support::MockTransport;

    struct NoopMetadata;
    impl PlatformMetadataProvider for NoopMetadata {
        fn discover(&self) -> Result<PlatformMetadata> {
            Err(VelError::MetadataUnavailable("no cloud platform in tests".into()))
        }
    }

    #[test]
    fn initialize_falls_back_to_config_metadata_on_discovery_failure() {
        let config = VelConfig::new("collector.example.com", 30000, "vnf-unit-test", "UNIT TEST");
        let transport = Arc::new(MockTransport::new());
        let mut client = VelClient::initialize(config, &NoopMetadata, transport).unwrap();
        assert_eq!(client.event_context().metadata().functional_role, "UNIT TEST");
        client.terminate();
    }

    #[test]
    fn post_event_after_terminate_is_rejected() {
        let config = VelConfig::new("collector.example.com", 30000, "vnf", "role");
        let transport = Arc::new(MockTransport::new());
        let mut client = VelClient::initialize(config, &NoopMetadata, transport).unwrap();
        client.terminate();

        let header = client.event_context().new_header(
            Domain::Heartbeat,
            "hb",
            Priority::Normal,
            SchemaVersion::new(1, None),
        );
        let err = client.post_event(Event::Heartbeat(header, HeartbeatFields::new()));
        assert!(matches!(err, Err(VelError::LifecycleMisuse(_))));
    }

    #[test]
    fn six_heartbeats_reach_transport_in_order() {
        let config = VelConfig::new("collector.example.com", 30000, "vnf", "role");
        let transport = Arc::new(MockTransport::new());
        let mut client = VelClient::initialize(config, &NoopMetadata, Arc::clone(&transport) as Arc<dyn Transport>).unwrap();

        for _ in 0..5 {
            let header = client.event_context().new_header(
                Domain::Heartbeat,
                "hb",
                Priority::Normal,
                SchemaVersion::new(1, None),
            );
            client
                .post_event(Event::Heartbeat(header, HeartbeatFields::new()))
                .unwrap();
        }
        client.terminate();
        assert_eq!(transport.post_count(), 5);
    }
}
