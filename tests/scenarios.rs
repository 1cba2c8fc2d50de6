//! End-to-end scenario tests (`spec.md` §8, S1-S6) driven against
//! `MockTransport` through the public `VelClient` surface rather than the
//! internal `wire`/`handler` modules directly — these exercise the whole
//! pipeline (factory -> ring buffer -> consumer thread -> encode -> POST
//! -> response dispatch) the way a real caller would.

use std::sync::Arc;

use vel_client::config::VelConfig;
use vel_client::model::domain::fault::{FaultFields, Severity, SourceType, VfStatus};
use vel_client::model::domain::heartbeat::HeartbeatFields;
use vel_client::model::domain::measurement::MeasurementFields;
use vel_client::platform::{PlatformMetadata, PlatformMetadataProvider};
use vel_client::transport::test_support::MockTransport;
use vel_client::transport::Transport;
use vel_client::{Domain, Event, Priority, SchemaVersion, VelClient, VelError};

struct FixedMetadata(PlatformMetadata);
impl PlatformMetadataProvider for FixedMetadata {
    fn discover(&self) -> vel_client::Result<PlatformMetadata> {
        Ok(self.0.clone())
    }
}

fn unit_test_metadata() -> FixedMetadata {
    FixedMetadata(PlatformMetadata {
        reporting_entity_name: "vm-name".into(),
        reporting_entity_id: Some("vm-uuid".into()),
        source_name: "vm-name".into(),
        source_id: Some("vm-uuid".into()),
        functional_role: "UNIT TEST".into(),
    })
}

/// Scenario S1 (`spec.md` §8), exercised through the full client: the
/// encoded envelope reaches the transport with the header fields the
/// scenario specifies.
#[test]
fn s1_heartbeat_baseline_reaches_transport() {
    let config = VelConfig::new("collector.example.com", 30000, "vnf", "UNIT TEST");
    let transport = Arc::new(MockTransport::new());
    let mut client =
        VelClient::initialize(config, &unit_test_metadata(), Arc::clone(&transport) as Arc<dyn Transport>)
            .unwrap();

    client.event_context().set_next_sequence(121);
    let mut header = client.event_context().new_header(
        Domain::Heartbeat,
        "Autonomous heartbeat",
        Priority::Normal,
        SchemaVersion::new(1, Some(2)),
    );
    header.event_type.set("Autonomous heartbeat".to_string(), "eventType");
    client
        .post_event(Event::Heartbeat(header, HeartbeatFields::new()))
        .unwrap();
    client.terminate();

    let posts = transport.posts();
    assert_eq!(posts.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&posts[0].body).unwrap();
    let header = &body["event"]["commonEventHeader"];
    assert_eq!(header["domain"], "heartbeat");
    assert_eq!(header["eventId"], "121");
    assert_eq!(header["sequence"], 121);
    assert_eq!(header["version"], 1.2);
    assert_eq!(header["eventType"], "Autonomous heartbeat");
}

/// Scenario S4 (`spec.md` §8): a `measurementIntervalChange` command in
/// the collector's reply updates state the next `post_event` caller can
/// observe via `VelClient::measurement_interval`.
#[test]
fn s4_measurement_interval_change_is_observable_after_one_post() {
    let config = VelConfig::new("collector.example.com", 30000, "vnf", "role");
    let transport = Arc::new(MockTransport::new());
    transport.push_response(
        br#"{"commandList":[{"command":{"commandType":"measurementIntervalChange","measurementInterval":45}}]}"#
            .to_vec(),
    );
    let mut client =
        VelClient::initialize(config, &unit_test_metadata(), Arc::clone(&transport) as Arc<dyn Transport>)
            .unwrap();

    assert_eq!(client.measurement_interval(), None);
    let header =
        client
            .event_context()
            .new_header(Domain::Heartbeat, "hb", Priority::Normal, SchemaVersion::new(1, None));
    client
        .post_event(Event::Heartbeat(header, HeartbeatFields::new()))
        .unwrap();
    client.terminate();

    assert_eq!(client.measurement_interval(), Some(45));
}

/// Scenario S5 (`spec.md` §8): a `provideThrottlingState` command makes
/// the handler POST a second, distinct request to the throttling-state
/// URL, reporting the domain currently under suppression.
#[test]
fn s5_provide_throttling_state_round_trips_through_the_client() {
    let config = VelConfig::new("collector.example.com", 30000, "vnf", "role");
    let transport = Arc::new(MockTransport::new());
    // First reply installs a throttle spec on the fault domain; second
    // reply (for the fault event below) asks for the state back.
    transport.push_response(
        br#"{"commandList":[{"command":{"commandType":"throttlingSpecification","eventDomainThrottleSpecification":{
            "eventDomain":"fault","suppressedFieldNames":["alarmInterfaceA"]
        }}}]}"#
            .to_vec(),
    );
    transport.push_response(
        br#"{"commandList":[{"command":{"commandType":"provideThrottlingState"}}]}"#.to_vec(),
    );

    let mut client =
        VelClient::initialize(config, &unit_test_metadata(), Arc::clone(&transport) as Arc<dyn Transport>)
            .unwrap();

    for _ in 0..2 {
        let header = client.event_context().new_header(
            Domain::Fault,
            "fault",
            Priority::High,
            SchemaVersion::new(4, Some(0)),
        );
        let fields = FaultFields::new(
            "condition",
            "problem",
            Severity::Major,
            SourceType::Vm,
            VfStatus::Active,
        );
        client.post_event(Event::Fault(header, fields)).unwrap();
    }
    client.terminate();

    let posts = transport.posts();
    // event, event, then the throttling-state reply triggered by the
    // second event's response.
    assert_eq!(posts.len(), 3);
    assert_eq!(
        posts[2].url,
        "http://collector.example.com:30000/eventListener/v7.1/clientThrottlingState"
    );
    let state: serde_json::Value = serde_json::from_slice(&posts[2].body).unwrap();
    assert_eq!(state["eventThrottlingState"]["eventThrottlingMode"], "throttled");
}

/// Scenario S6 (`spec.md` §8): five heartbeats posted before `terminate`
/// all reach the transport, in order, before the consumer thread exits.
#[test]
fn s6_ordered_shutdown_delivers_all_queued_events() {
    let config = VelConfig::new("collector.example.com", 30000, "vnf", "role");
    let transport = Arc::new(MockTransport::new());
    let mut client =
        VelClient::initialize(config, &unit_test_metadata(), Arc::clone(&transport) as Arc<dyn Transport>)
            .unwrap();

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

    let header = client.event_context().new_header(
        Domain::Heartbeat,
        "hb",
        Priority::Normal,
        SchemaVersion::new(1, None),
    );
    let err = client.post_event(Event::Heartbeat(header, HeartbeatFields::new()));
    assert!(matches!(err, Err(VelError::LifecycleMisuse(_))));
}

/// A measurement event with an empty CPU-usage array collapses to no
/// `cpuUsageArray` key at all (`spec.md` §4.2: "empty optional
/// collections are omitted entirely, never emitted as `[]`"), exercised
/// here through the full client rather than `wire::encode_event` directly.
#[test]
fn measurement_with_no_cpu_usage_omits_the_array() {
    let config = VelConfig::new("collector.example.com", 30000, "vnf", "role");
    let transport = Arc::new(MockTransport::new());
    let mut client =
        VelClient::initialize(config, &unit_test_metadata(), Arc::clone(&transport) as Arc<dyn Transport>)
            .unwrap();

    let header = client.event_context().new_header(
        Domain::Measurement,
        "measurement",
        Priority::Normal,
        SchemaVersion::new(4, Some(0)),
    );
    let fields = MeasurementFields::new(60.0).unwrap();
    client.post_event(Event::Measurement(header, fields)).unwrap();
    client.terminate();

    let posts = transport.posts();
    let body = String::from_utf8(posts[0].body.clone()).unwrap();
    assert!(!body.contains("cpuUsageArray"));
}
