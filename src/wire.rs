//! Per-domain wire encoding (`spec.md` §4.3's "per-domain encoders" and
//! §6.1's wire envelope). Each `encode_<domain>_fields` wraps the shared
//! header encoder and opens `<domain>Fields`, applying the domain's
//! throttle spec (if any) to its own optional fields and collections —
//! exactly one throttle lookup per event, taken once before encoding and
//! held for the whole encode (`spec.md` §4.4 concurrency note: "readers see
//! a consistent spec for the duration of a single encode").
//!
//! Grounded on `original_source/vnfs/VES/code/evel_library/evel_event.c`'s
//! `evel_json_encode_header`/`evel_json_encode_event` dispatch and
//! `evel_scaling_measurement.c`'s per-collection checkpoint/rewind
//! placement (container key opened, items filtered, rewind if nothing
//! survived filtering).

use crate::encoder::{field_suppressed, nv_pair_suppressed, JsonEncoder};
use crate::error::Result;
use crate::model::domain::batch::BatchFields;
use crate::model::domain::fault::FaultFields;
use crate::model::domain::heartbeat::HeartbeatFields;
use crate::model::domain::measurement::MeasurementFields;
use crate::model::domain::mobile_flow::MobileFlowFields;
use crate::model::domain::other::OtherFields;
use crate::model::domain::report::ReportFields;
use crate::model::domain::service::ServiceFields;
use crate::model::domain::signaling::SignalingFields;
use crate::model::domain::state_change::StateChangeFields;
use crate::model::domain::syslog::SyslogFields;
use crate::model::domain::NameValuePair;
use crate::model::event::Event;
use crate::model::header::CommonEventHeader;
use crate::throttle::{ThrottleRegistry, ThrottleSpec};

/// Maximum length a single string value is allowed to reach before the
/// encoder truncates it (`spec.md` §4.3). Generous enough that no
/// well-formed field trips it in practice; it exists to bound a runaway
/// producer, not to clip normal values.
const MAX_STRING_CHARS: usize = 4096;

/// Writes `commonEventHeader` (`spec.md` §3.1, §6.1). Key order matches
/// `evel_json_encode_header`: mandatory fields alphabetically, then the
/// three optionals alphabetically.
fn encode_header(enc: &mut JsonEncoder, header: &CommonEventHeader) -> Result<()> {
    enc.named_object("commonEventHeader");
    enc.kv_string("domain", header.domain.wire_name(), MAX_STRING_CHARS)?;
    enc.kv_string("eventId", &header.event_id, MAX_STRING_CHARS)?;
    enc.kv_string("functionalRole", &header.functional_role, MAX_STRING_CHARS)?;
    enc.kv_uint64("lastEpochMicrosec", header.last_epoch_microsec)?;
    enc.kv_string("priority", header.priority.wire_name(), MAX_STRING_CHARS)?;
    enc.kv_string(
        "reportingEntityName",
        &header.reporting_entity_name,
        MAX_STRING_CHARS,
    )?;
    enc.kv_int("sequence", header.sequence as i64)?;
    enc.kv_string("sourceName", &header.source_name, MAX_STRING_CHARS)?;
    enc.kv_uint64("startEpochMicrosec", header.start_epoch_microsec)?;
    encode_version(enc, header.version.major, header.version.minor)?;

    if let Some(event_type) = header.event_type.get() {
        enc.kv_string("eventType", event_type, MAX_STRING_CHARS)?;
    }
    if let Some(id) = header.reporting_entity_id.get() {
        enc.kv_string("reportingEntityId", id, MAX_STRING_CHARS)?;
    }
    if let Some(id) = header.source_id.get() {
        enc.kv_string("sourceId", id, MAX_STRING_CHARS)?;
    }
    enc.end_object();
    Ok(())
}

/// `"version": N` or `"version": N.M` (`spec.md` §4.3). `evel_enc_version`
/// in the C source always renders a decimal point when a minor version is
/// present; `rustc`'s `{:.1}` on an integer-valued `f64` does the same.
fn encode_version(enc: &mut JsonEncoder, major: u32, minor: Option<u32>) -> Result<()> {
    match minor {
        Some(minor) => enc.kv_double("version", major as f64 + (minor as f64) / 10.0),
        None => enc.kv_int("version", major as i64),
    }
}

/// Writes one ordered (name,value) list as a throttle-filtered JSON array,
/// rewinding if filtering leaves it empty (`spec.md` §4.3 suppression
/// contract, §9 "the most subtle piece").
fn encode_nv_pair_list(
    enc: &mut JsonEncoder,
    throttle: Option<&ThrottleSpec>,
    container_name: &str,
    items: &[NameValuePair],
) {
    if items.is_empty() {
        return;
    }
    enc.checkpoint();
    enc.named_array(container_name);
    for item in items {
        if nv_pair_suppressed(throttle, container_name, &item.name) {
            continue;
        }
        enc.start_object();
        let _ = enc.kv_string("name", &item.name, MAX_STRING_CHARS);
        let _ = enc.kv_string("value", &item.value, MAX_STRING_CHARS);
        enc.end_object();
    }
    enc.end_array();
    if enc.last_closed_was_empty() {
        enc.rewind();
    } else {
        enc.commit();
    }
}

/// Top-level dispatch: encodes one `Event` into a complete wire envelope
/// (`spec.md` §4.3: `{"event": {"commonEventHeader": {...},
/// "<domain>Fields": {...}}}`, or `{"eventList": [...]}` for a batch).
/// `registry` supplies the per-domain throttle spec consulted while
/// encoding (`spec.md` §4.4).
pub fn encode_event(event: &Event, registry: &ThrottleRegistry) -> Result<Vec<u8>> {
    let mut enc = JsonEncoder::new();
    encode_event_into(&mut enc, event, registry)?;
    Ok(enc.into_bytes())
}

fn encode_event_into(enc: &mut JsonEncoder, event: &Event, registry: &ThrottleRegistry) -> Result<()> {
    if let Event::Batch(_, batch) = event {
        return encode_batch(enc, batch, registry);
    }

    enc.start_object();
    enc.named_object("event");
    let header = event
        .header()
        .expect("non-batch, non-internal events always carry a header");
    encode_header(enc, header)?;

    let throttle = registry.get(header.domain);
    let throttle = throttle.as_deref();

    match event {
        Event::Heartbeat(_, fields) => encode_heartbeat(enc, fields, throttle)?,
        Event::Fault(_, fields) => encode_fault(enc, fields, throttle)?,
        Event::Measurement(_, fields) => encode_measurement(enc, fields, throttle)?,
        Event::MobileFlow(_, fields) => encode_mobile_flow(enc, fields, throttle)?,
        Event::Report(_, fields) => encode_report(enc, fields, throttle)?,
        Event::Service(_, fields) => encode_service(enc, fields, throttle)?,
        Event::Signaling(_, fields) => encode_signaling(enc, fields, throttle)?,
        Event::StateChange(_, fields) => encode_state_change(enc, fields, throttle)?,
        Event::Syslog(_, fields) => encode_syslog(enc, fields, throttle)?,
        Event::Other(_, fields) => encode_other(enc, fields, throttle)?,
        Event::Batch(..) | Event::Internal(_) => unreachable!("handled above / never encoded"),
    }

    enc.end_object();
    enc.end_object();
    Ok(())
}

/// A batch has no `commonEventHeader`/`<domain>Fields` shape of its own: it
/// wraps N complete event envelopes in an array (`spec.md` §3.3, §6.1).
fn encode_batch(enc: &mut JsonEncoder, batch: &BatchFields, registry: &ThrottleRegistry) -> Result<()> {
    enc.start_object();
    enc.named_array("eventList");
    for child in &batch.events {
        encode_event_into(enc, child, registry)?;
    }
    enc.end_array();
    enc.end_object();
    Ok(())
}

fn encode_heartbeat(
    enc: &mut JsonEncoder,
    fields: &HeartbeatFields,
    throttle: Option<&ThrottleSpec>,
) -> Result<()> {
    enc.named_object("heartbeatFields");
    if let Some(interval) = fields.heartbeat_interval.get() {
        if !field_suppressed(throttle, "heartbeatInterval") {
            enc.kv_int("heartbeatInterval", *interval)?;
        }
    }
    if let Some(version) = fields.heartbeat_field_version.get() {
        if !field_suppressed(throttle, "heartbeatFieldsVersion") {
            enc.kv_string("heartbeatFieldsVersion", version, MAX_STRING_CHARS)?;
        }
    }
    enc.end_object();
    Ok(())
}

fn encode_fault(enc: &mut JsonEncoder, fields: &FaultFields, throttle: Option<&ThrottleSpec>) -> Result<()> {
    enc.named_object("faultFields");
    enc.kv_string("alarmCondition", &fields.alarm_condition, MAX_STRING_CHARS)?;
    enc.kv_string("specificProblem", &fields.specific_problem, MAX_STRING_CHARS)?;
    enc.kv_string("eventSeverity", fields.event_severity.wire_name(), MAX_STRING_CHARS)?;
    enc.kv_string(
        "eventSourceType",
        fields.event_source_type.wire_name(),
        MAX_STRING_CHARS,
    )?;
    enc.kv_string("vfStatus", fields.vf_status.wire_name(), MAX_STRING_CHARS)?;

    if let Some(v) = fields.alarm_category.get() {
        if !field_suppressed(throttle, "alarmCategory") {
            enc.kv_string("alarmCategory", v, MAX_STRING_CHARS)?;
        }
    }
    if let Some(v) = fields.alarm_interface_a.get() {
        if !field_suppressed(throttle, "alarmInterfaceA") {
            enc.kv_string("alarmInterfaceA", v, MAX_STRING_CHARS)?;
        }
    }
    if let Some(v) = fields.event_category.get() {
        if !field_suppressed(throttle, "eventCategory") {
            enc.kv_string("eventCategory", v, MAX_STRING_CHARS)?;
        }
    }
    if let Some(v) = fields.event_type.get() {
        if !field_suppressed(throttle, "eventType") {
            enc.kv_string("eventType", v, MAX_STRING_CHARS)?;
        }
    }

    encode_nv_pair_list(
        enc,
        throttle,
        "alarmAdditionalInformation",
        &fields.additional_info,
    );
    enc.end_object();
    Ok(())
}

fn encode_measurement(
    enc: &mut JsonEncoder,
    fields: &MeasurementFields,
    throttle: Option<&ThrottleSpec>,
) -> Result<()> {
    enc.named_object("measurementsForVfScalingFields");
    enc.kv_double("measurementInterval", fields.measurement_interval)?;

    if let Some(v) = fields.aggregate_cpu_usage.get() {
        if !field_suppressed(throttle, "aggregateCpuUsage") {
            enc.kv_double("aggregateCpuUsage", *v)?;
        }
    }
    if let Some(v) = fields.memory_configured.get() {
        if !field_suppressed(throttle, "memoryConfigured") {
            enc.kv_double("memoryConfigured", *v)?;
        }
    }
    if let Some(v) = fields.memory_used.get() {
        if !field_suppressed(throttle, "memoryUsed") {
            enc.kv_double("memoryUsed", *v)?;
        }
    }
    if let Some(v) = fields.request_rate.get() {
        if !field_suppressed(throttle, "requestRate") {
            enc.kv_int("requestRate", *v)?;
        }
    }
    if let Some(v) = fields.mean_request_latency.get() {
        if !field_suppressed(throttle, "meanRequestLatency") {
            enc.kv_double("meanRequestLatency", *v)?;
        }
    }
    if let Some(v) = fields.concurrent_sessions.get() {
        if !field_suppressed(throttle, "concurrentSessions") {
            enc.kv_int("concurrentSessions", *v)?;
        }
    }
    if let Some(v) = fields.configured_entities.get() {
        if !field_suppressed(throttle, "configuredEntities") {
            enc.kv_int("configuredEntities", *v)?;
        }
    }
    if let Some(v) = fields.media_ports_in_use.get() {
        if !field_suppressed(throttle, "mediaPortsInUse") {
            enc.kv_int("mediaPortsInUse", *v)?;
        }
    }
    if let Some(v) = fields.vnfc_scaling_metric.get() {
        if !field_suppressed(throttle, "vnfcScalingMetric") {
            enc.kv_int("vnfcScalingMetric", *v)?;
        }
    }

    if let Some(errors) = fields.errors.get() {
        if !field_suppressed(throttle, "errors") {
            enc.named_object("errors");
            enc.kv_int("receiveDiscards", errors.receive_discards)?;
            enc.kv_int("receiveErrors", errors.receive_errors)?;
            enc.kv_int("transmitDiscards", errors.transmit_discards)?;
            enc.kv_int("transmitErrors", errors.transmit_errors)?;
            enc.end_object();
        }
    }

    if !fields.cpu_usage.is_empty() {
        enc.checkpoint();
        enc.named_array("cpuUsageArray");
        for cpu in &fields.cpu_usage {
            if nv_pair_suppressed(throttle, "cpuUsageArray", &cpu.cpu_identifier) {
                continue;
            }
            enc.start_object();
            enc.kv_string("cpuIdentifier", &cpu.cpu_identifier, MAX_STRING_CHARS)?;
            enc.kv_double("percentUsage", cpu.percent_usage)?;
            if let Some(v) = cpu.cpu_idle.get() {
                enc.kv_double("cpuIdle", *v)?;
            }
            if let Some(v) = cpu.cpu_usage_interrupt.get() {
                enc.kv_double("cpuUsageInterrupt", *v)?;
            }
            if let Some(v) = cpu.cpu_usage_nice.get() {
                enc.kv_double("cpuUsageNice", *v)?;
            }
            if let Some(v) = cpu.cpu_usage_soft_irq.get() {
                enc.kv_double("cpuUsageSoftIrq", *v)?;
            }
            if let Some(v) = cpu.cpu_usage_steal.get() {
                enc.kv_double("cpuUsageSteal", *v)?;
            }
            if let Some(v) = cpu.cpu_usage_system.get() {
                enc.kv_double("cpuUsageSystem", *v)?;
            }
            if let Some(v) = cpu.cpu_usage_user.get() {
                enc.kv_double("cpuUsageUser", *v)?;
            }
            if let Some(v) = cpu.cpu_wait.get() {
                enc.kv_double("cpuWait", *v)?;
            }
            enc.end_object();
        }
        enc.end_array();
        if enc.last_closed_was_empty() {
            enc.rewind();
        } else {
            enc.commit();
        }
    }

    if !fields.filesystem_usage.is_empty() {
        enc.named_array("filesystemUsageArray");
        for fs in &fields.filesystem_usage {
            enc.start_object();
            enc.kv_string("filesystemName", &fs.filesystem_name, MAX_STRING_CHARS)?;
            enc.kv_double("blockConfigured", fs.block_configured)?;
            enc.kv_int("blockIops", fs.block_iops)?;
            enc.kv_double("blockUsed", fs.block_used)?;
            enc.kv_double("ephemeralConfigured", fs.ephemeral_configured)?;
            enc.kv_int("ephemeralIops", fs.ephemeral_iops)?;
            enc.kv_double("ephemeralUsed", fs.ephemeral_used)?;
            enc.end_object();
        }
        enc.end_array();
    }

    if !fields.latency_distribution.is_empty() {
        enc.named_array("latencyDistribution");
        for bucket in &fields.latency_distribution {
            enc.start_object();
            if let Some(v) = bucket.low_end.get() {
                enc.kv_double("lowEndOfLatencyBucket", *v)?;
            }
            if let Some(v) = bucket.high_end.get() {
                enc.kv_double("highEndOfLatencyBucket", *v)?;
            }
            enc.kv_int("countsInTheBucket", bucket.count_in_the_bucket)?;
            enc.end_object();
        }
        enc.end_array();
    }

    if !fields.vnic_usage.is_empty() {
        enc.checkpoint();
        enc.named_array("vNicUsageArray");
        for vnic in &fields.vnic_usage {
            if nv_pair_suppressed(throttle, "vNicUsageArray", &vnic.vnic_identifier) {
                continue;
            }
            enc.start_object();
            enc.kv_string("vNicIdentifier", &vnic.vnic_identifier, MAX_STRING_CHARS)?;
            enc.kv_bool("valuesAreSuspect", vnic.values_are_suspect)?;
            encode_vnic_counters(enc, "Delta", &vnic.delta)?;
            encode_vnic_counters(enc, "Accumulated", &vnic.accumulated)?;
            enc.end_object();
        }
        enc.end_array();
        if enc.last_closed_was_empty() {
            enc.rewind();
        } else {
            enc.commit();
        }
    }

    if !fields.codec_usage.is_empty() {
        enc.checkpoint();
        enc.named_array("codecUsageArray");
        for codec in &fields.codec_usage {
            if nv_pair_suppressed(throttle, "codecUsageArray", &codec.codec_identifier) {
                continue;
            }
            enc.start_object();
            enc.kv_string("codecIdentifier", &codec.codec_identifier, MAX_STRING_CHARS)?;
            enc.kv_int("numberInUse", codec.number_in_use)?;
            enc.end_object();
        }
        enc.end_array();
        if enc.last_closed_was_empty() {
            enc.rewind();
        } else {
            enc.commit();
        }
    }

    if !fields.feature_usage.is_empty() {
        enc.checkpoint();
        enc.named_array("featureUsageArray");
        for feature in &fields.feature_usage {
            if nv_pair_suppressed(throttle, "featureUsageArray", &feature.feature_identifier) {
                continue;
            }
            enc.start_object();
            enc.kv_string(
                "featureIdentifier",
                &feature.feature_identifier,
                MAX_STRING_CHARS,
            )?;
            enc.kv_int("featureUtilization", feature.feature_utilization)?;
            enc.end_object();
        }
        enc.end_array();
        if enc.last_closed_was_empty() {
            enc.rewind();
        } else {
            enc.commit();
        }
    }

    encode_measurement_groups(enc, throttle, &fields.additional_measurements)?;

    enc.end_object();
    Ok(())
}

fn encode_vnic_counters(
    enc: &mut JsonEncoder,
    suffix: &str,
    counters: &crate::model::domain::measurement::VnicCounters,
) -> Result<()> {
    macro_rules! opt {
        ($field:ident, $name:expr) => {
            if let Some(v) = counters.$field.get() {
                enc.kv_int(&format!("{}{}", $name, suffix), *v)?;
            }
        };
    }
    opt!(broadcast_packets_in, "broadcastPacketsIn");
    opt!(broadcast_packets_out, "broadcastPacketsOut");
    opt!(bytes_in, "bytesIn");
    opt!(bytes_out, "bytesOut");
    opt!(multicast_packets_in, "multicastPacketsIn");
    opt!(multicast_packets_out, "multicastPacketsOut");
    opt!(packets_in, "packetsIn");
    opt!(packets_out, "packetsOut");
    opt!(unicast_packets_in, "unicastPacketsIn");
    opt!(unicast_packets_out, "unicastPacketsOut");
    Ok(())
}

/// `additionalMeasurements`: an array of `{name, measurements: [...]}`
/// groups (`spec.md` §4.2's two-level structure). Each group's inner list
/// is independently throttle-filtered by nv-pair name, keyed on the
/// group's own name as the container.
fn encode_measurement_groups(
    enc: &mut JsonEncoder,
    throttle: Option<&ThrottleSpec>,
    groups: &[crate::model::domain::measurement::MeasurementGroup],
) -> Result<()> {
    if groups.is_empty() {
        return Ok(());
    }
    enc.checkpoint();
    enc.named_array("additionalMeasurements");
    // The encoder holds at most one live checkpoint (`spec.md` §9), so a
    // group that would end up empty after nv-pair filtering is decided
    // before writing anything, rather than opened and rewound with a
    // second, nested checkpoint. The outer checkpoint above stays live for
    // the whole array; `wrote_any_group` is the only tracking needed for it.
    let mut wrote_any_group = false;
    for group in groups {
        let visible: Vec<_> = group
            .measurements
            .iter()
            .filter(|pair| !nv_pair_suppressed(throttle, &group.name, &pair.name))
            .collect();
        if visible.is_empty() {
            continue;
        }
        enc.start_object();
        enc.kv_string("name", &group.name, MAX_STRING_CHARS)?;
        enc.named_array("measurements");
        for pair in visible {
            enc.start_object();
            enc.kv_string("name", &pair.name, MAX_STRING_CHARS)?;
            enc.kv_string("value", &pair.value, MAX_STRING_CHARS)?;
            enc.end_object();
        }
        enc.end_array();
        enc.end_object();
        wrote_any_group = true;
    }
    enc.end_array();
    if wrote_any_group {
        enc.commit();
    } else {
        enc.rewind();
    }
    Ok(())
}

fn encode_mobile_flow(
    enc: &mut JsonEncoder,
    fields: &MobileFlowFields,
    throttle: Option<&ThrottleSpec>,
) -> Result<()> {
    enc.named_object("mobileFlowFields");
    enc.kv_string("flowDirection", fields.flow_direction.wire_name(), MAX_STRING_CHARS)?;
    enc.kv_string("gtpProtocolType", &fields.gtp_protocol_type, MAX_STRING_CHARS)?;
    enc.kv_string("gtpVersion", &fields.gtp_version, MAX_STRING_CHARS)?;
    enc.kv_string("ipProtocolType", &fields.ip_protocol_type, MAX_STRING_CHARS)?;
    enc.kv_string("ipVersion", &fields.ip_version, MAX_STRING_CHARS)?;
    enc.kv_string(
        "otherEndpointIpAddress",
        &fields.other_endpoint_ip_address,
        MAX_STRING_CHARS,
    )?;
    enc.kv_int("otherEndpointPort", fields.other_endpoint_port)?;
    enc.kv_string("otherFunctionalRole", &fields.other_functional_role, MAX_STRING_CHARS)?;
    enc.kv_string(
        "reportingEndpointIpAddress",
        &fields.reporting_endpoint_ip_address,
        MAX_STRING_CHARS,
    )?;
    enc.kv_int("reportingEndpointPort", fields.reporting_endpoint_port)?;

    enc.named_object("gtpPerFlowMetrics");
    encode_gtp_per_flow_metrics(enc, &fields.flow_metrics)?;
    enc.end_object();

    if let Some(v) = fields.http_header.get() {
        if !field_suppressed(throttle, "httpHeader") {
            enc.kv_string("httpHeader", v, MAX_STRING_CHARS)?;
        }
    }
    macro_rules! opt_str {
        ($field:ident, $wire:expr) => {
            if let Some(v) = fields.$field.get() {
                if !field_suppressed(throttle, $wire) {
                    enc.kv_string($wire, v, MAX_STRING_CHARS)?;
                }
            }
        };
    }
    opt_str!(application_type, "applicationType");
    opt_str!(app_protocol_type, "appProtocolType");
    opt_str!(app_protocol_version, "appProtocolVersion");
    opt_str!(cid, "cid");
    opt_str!(connection_type, "connectionType");
    opt_str!(ecgi, "ecgi");
    opt_str!(gtp_protocol_version, "gtpProtocolVersion");
    opt_str!(imei, "imei");
    opt_str!(imsi, "imsi");
    opt_str!(lac, "lac");
    opt_str!(mcc, "mcc");
    opt_str!(mnc, "mnc");
    opt_str!(msisdn, "msisdn");
    opt_str!(other_function_role, "otherFunctionRole");
    opt_str!(rac, "rac");
    opt_str!(radio_access_technology, "radioAccessTechnology");
    opt_str!(sac, "sac");
    opt_str!(tac, "tac");
    opt_str!(tunnel_id, "tunnelId");
    opt_str!(vlan_id, "vlanId");

    if let Some(v) = fields.sampling_algorithm.get() {
        if !field_suppressed(throttle, "samplingAlgorithm") {
            enc.kv_int("samplingAlgorithm", *v)?;
        }
    }

    encode_nv_pair_list(enc, throttle, "additionalInfo", &fields.additional_info);
    enc.end_object();
    Ok(())
}

fn encode_gtp_per_flow_metrics(
    enc: &mut JsonEncoder,
    m: &crate::model::domain::mobile_flow::GtpPerFlowMetrics,
) -> Result<()> {
    enc.kv_double("avgBitErrorRate", m.avg_bit_error_rate)?;
    enc.kv_double("avgPacketDelayVariation", m.avg_packet_delay_variation)?;
    enc.kv_double("avgPacketLatency", m.avg_packet_latency)?;
    enc.kv_double("avgReceiveThroughput", m.avg_receive_throughput)?;
    enc.kv_double("avgTransmitThroughput", m.avg_transmit_throughput)?;
    enc.kv_uint64("flowActivationEpoch", m.flow_activation_epoch)?;
    enc.kv_uint64("flowActivationMicrosec", m.flow_activation_microsec)?;
    enc.kv_uint64("flowDeactivationEpoch", m.flow_deactivation_epoch)?;
    enc.kv_uint64("flowDeactivationMicrosec", m.flow_deactivation_microsec)?;
    enc.kv_uint64("flowDeactivationTime", m.flow_deactivation_time)?;
    enc.kv_string("flowStatus", &m.flow_status, MAX_STRING_CHARS)?;
    enc.kv_double("maxPacketDelayVariation", m.max_packet_delay_variation)?;
    enc.kv_int("numActivationFailures", m.num_activation_failures)?;
    enc.kv_int("numBitErrors", m.num_bit_errors)?;
    enc.kv_int("numBytesReceived", m.num_bytes_received)?;
    enc.kv_int("numBytesTransmitted", m.num_bytes_transmitted)?;
    enc.kv_int("numDroppedPackets", m.num_dropped_packets)?;
    enc.kv_int("numL7BytesReceived", m.num_l7_bytes_received)?;
    enc.kv_int("numL7BytesTransmitted", m.num_l7_bytes_transmitted)?;
    enc.kv_int("numLostPackets", m.num_lost_packets)?;
    enc.kv_int("numOutOfOrderPackets", m.num_out_of_order_packets)?;
    enc.kv_int("numPacketErrors", m.num_packet_errors)?;
    enc.kv_int("numPacketsReceivedExclRetrans", m.num_packets_received_excl_retrans)?;
    enc.kv_int("numPacketsReceivedInclRetrans", m.num_packets_received_incl_retrans)?;
    enc.kv_int("numPacketsTransmittedInclRetrans", m.num_packets_transmitted_incl_retrans)?;
    enc.kv_int("numRetransmittedPackets", m.num_retransmitted_packets)?;
    enc.kv_int("numTimeoutRetransmittedPackets", m.num_timeout_retransmitted_packets)?;
    enc.kv_int("numTunneledL7BytesReceived", m.num_tunneled_l7_bytes_received)?;
    enc.kv_int("roundTripTime", m.round_trip_time)?;
    enc.kv_int("timeToFirstByte", m.time_to_first_byte)?;

    if !m.tcp_flag_count_list.is_empty() {
        enc.named_array("tcpFlagCountList");
        for flag in &m.tcp_flag_count_list {
            enc.start_object();
            enc.kv_string("tcpFlag", flag.tcp_flag, MAX_STRING_CHARS)?;
            enc.kv_int("tcpFlagCount", flag.count)?;
            enc.end_object();
        }
        enc.end_array();
    }
    if !m.qci_cos_count_list.is_empty() {
        enc.named_array("qciCosCountList");
        for q in &m.qci_cos_count_list {
            enc.start_object();
            enc.kv_string("qciCos", &q.qci_cos, MAX_STRING_CHARS)?;
            enc.kv_int("qciCosCount", q.count)?;
            enc.end_object();
        }
        enc.end_array();
    }
    if !m.ip_tos_count_list.is_empty() {
        enc.named_array("ipTosCountList");
        for (tos, count) in &m.ip_tos_count_list {
            enc.start_object();
            enc.kv_string("ipTos", tos, MAX_STRING_CHARS)?;
            enc.kv_int("ipTosCount", *count)?;
            enc.end_object();
        }
        enc.end_array();
    }
    if let Some(v) = m.dur_connection_failed_status.get() {
        enc.kv_string("durConnectionFailedStatus", v, MAX_STRING_CHARS)?;
    }
    if let Some(v) = m.dur_tunnel_failed_status.get() {
        enc.kv_string("durTunnelFailedStatus", v, MAX_STRING_CHARS)?;
    }
    if let Some(v) = m.large_packet_rtt.get() {
        enc.kv_int("largePacketRtt", *v)?;
    }
    if let Some(v) = m.large_packet_threshold.get() {
        enc.kv_double("largePacketThreshold", *v)?;
    }
    if let Some(v) = m.max_receive_bit_rate.get() {
        enc.kv_int("maxReceiveBitRate", *v)?;
    }
    if let Some(v) = m.max_transmit_bit_rate.get() {
        enc.kv_int("maxTransmitBitRate", *v)?;
    }
    Ok(())
}

fn encode_report(enc: &mut JsonEncoder, fields: &ReportFields, throttle: Option<&ThrottleSpec>) -> Result<()> {
    enc.named_object("reportFields");
    enc.kv_double("measurementInterval", fields.measurement_interval)?;
    if let Some(v) = fields.reporting_entity_name.get() {
        if !field_suppressed(throttle, "reportingEntityName") {
            enc.kv_string("reportingEntityName", v, MAX_STRING_CHARS)?;
        }
    }
    if let Some(v) = fields.reporting_entity_id.get() {
        if !field_suppressed(throttle, "reportingEntityId") {
            enc.kv_string("reportingEntityId", v, MAX_STRING_CHARS)?;
        }
    }
    if !fields.feature_usage_array.is_empty() {
        enc.checkpoint();
        enc.named_array("featureUsageArray");
        for (name, count) in &fields.feature_usage_array {
            if nv_pair_suppressed(throttle, "featureUsageArray", name) {
                continue;
            }
            enc.start_object();
            enc.kv_string("featureIdentifier", name, MAX_STRING_CHARS)?;
            enc.kv_int("featureUtilization", *count)?;
            enc.end_object();
        }
        enc.end_array();
        if enc.last_closed_was_empty() {
            enc.rewind();
        } else {
            enc.commit();
        }
    }
    encode_measurement_groups(enc, throttle, &fields.measurement_groups)?;
    enc.end_object();
    Ok(())
}

fn encode_service(enc: &mut JsonEncoder, fields: &ServiceFields, throttle: Option<&ThrottleSpec>) -> Result<()> {
    enc.named_object("serviceEventsFields");
    enc.kv_string("serviceInstanceId", &fields.service_instance_id, MAX_STRING_CHARS)?;
    enc.kv_string("correlator", &fields.correlator, MAX_STRING_CHARS)?;

    if let Some(codec) = fields.codec_selection.get() {
        if !field_suppressed(throttle, "codecSelected") {
            enc.kv_string("codecSelected", &codec.codec_selected, MAX_STRING_CHARS)?;
            enc.kv_bool("codecSelectedTranscoding", codec.codec_selected_transcoding)?;
        }
    }
    if let Some(rtcp) = fields.mid_call_rtcp.get() {
        if !field_suppressed(throttle, "midCallRtcp") {
            enc.named_object("midCallRtcp");
            if let Some(v) = rtcp.jitter.get() {
                enc.kv_int("jitter", *v)?;
            }
            if let Some(v) = rtcp.packets_lost.get() {
                enc.kv_int("packetsLost", *v)?;
            }
            if let Some(v) = rtcp.round_trip_delay_ms.get() {
                enc.kv_int("roundTripDelayMs", *v)?;
            }
            enc.end_object();
        }
    }
    if let Some(vqm) = fields.end_of_call_vqm.get() {
        if !field_suppressed(throttle, "endOfCallVqmSummaries") {
            enc.named_object("endOfCallVqmSummaries");
            if let Some(v) = vqm.adjacency_name.get() {
                enc.kv_string("adjacencyName", v, MAX_STRING_CHARS)?;
            }
            if let Some(v) = vqm.mos_cqe.get() {
                enc.kv_double("mosCqe", *v)?;
            }
            if let Some(v) = vqm.packets_lost.get() {
                enc.kv_int("packetsLost", *v)?;
            }
            if let Some(v) = vqm.r_factor.get() {
                enc.kv_int("rFactor", *v)?;
            }
            enc.end_object();
        }
    }

    encode_nv_pair_list(enc, throttle, "additionalFields", &fields.additional_info);
    enc.end_object();
    Ok(())
}

fn encode_signaling(
    enc: &mut JsonEncoder,
    fields: &SignalingFields,
    throttle: Option<&ThrottleSpec>,
) -> Result<()> {
    enc.named_object("signalingFields");
    enc.kv_string("vendorVnfNameFields", &fields.vendor_vnfname_field, MAX_STRING_CHARS)?;
    enc.kv_string("vnfModuleName", &fields.vnfmodule_name, MAX_STRING_CHARS)?;
    enc.kv_string("vnfName", &fields.vnf_name, MAX_STRING_CHARS)?;
    enc.kv_string("correlator", &fields.correlator, MAX_STRING_CHARS)?;

    macro_rules! opt_str {
        ($field:ident, $wire:expr) => {
            if let Some(v) = fields.$field.get() {
                if !field_suppressed(throttle, $wire) {
                    enc.kv_string($wire, v, MAX_STRING_CHARS)?;
                }
            }
        };
    }
    opt_str!(local_ip_address, "localIpAddress");
    opt_str!(local_port, "localPort");
    opt_str!(remote_ip_address, "remoteIpAddress");
    opt_str!(remote_port, "remotePort");
    opt_str!(compressed_sip, "compressedSip");
    opt_str!(summary_sip, "summarySip");

    encode_nv_pair_list(enc, throttle, "additionalInformation", &fields.additional_info);
    enc.end_object();
    Ok(())
}

fn encode_state_change(
    enc: &mut JsonEncoder,
    fields: &StateChangeFields,
    throttle: Option<&ThrottleSpec>,
) -> Result<()> {
    enc.named_object("stateChangeFields");
    enc.kv_string("newState", fields.new_state.wire_name(), MAX_STRING_CHARS)?;
    enc.kv_string("oldState", fields.old_state.wire_name(), MAX_STRING_CHARS)?;
    enc.kv_string("stateInterface", &fields.state_interface, MAX_STRING_CHARS)?;
    encode_nv_pair_list(enc, throttle, "additionalFields", &fields.additional_fields);
    enc.end_object();
    Ok(())
}

fn encode_syslog(enc: &mut JsonEncoder, fields: &SyslogFields, throttle: Option<&ThrottleSpec>) -> Result<()> {
    enc.named_object("syslogFields");
    enc.kv_string("eventSourceType", &fields.event_source_type, MAX_STRING_CHARS)?;
    enc.kv_string("syslogMsg", &fields.syslog_msg, MAX_STRING_CHARS)?;
    enc.kv_string("syslogTag", &fields.syslog_tag, MAX_STRING_CHARS)?;

    if let Some(v) = fields.event_source_host.get() {
        if !field_suppressed(throttle, "eventSourceHost") {
            enc.kv_string("eventSourceHost", v, MAX_STRING_CHARS)?;
        }
    }
    if let Some(v) = fields.syslog_facility.get() {
        if !field_suppressed(throttle, "syslogFacility") {
            enc.kv_int("syslogFacility", v.rfc5424_code())?;
        }
    }
    if let Some(v) = fields.syslog_proc.get() {
        if !field_suppressed(throttle, "syslogProc") {
            enc.kv_string("syslogProc", v, MAX_STRING_CHARS)?;
        }
    }
    if let Some(v) = fields.syslog_proc_id.get() {
        if !field_suppressed(throttle, "syslogProcId") {
            enc.kv_int("syslogProcId", *v)?;
        }
    }
    if let Some(v) = fields.syslog_sdata.get() {
        if !field_suppressed(throttle, "syslogSData") {
            enc.kv_string("syslogSData", v, MAX_STRING_CHARS)?;
        }
    }
    if let Some(v) = fields.syslog_severity.get() {
        if !field_suppressed(throttle, "syslogSev") {
            enc.kv_string("syslogSev", v, MAX_STRING_CHARS)?;
        }
    }
    if let Some(v) = fields.syslog_ver.get() {
        if !field_suppressed(throttle, "syslogVer") {
            enc.kv_int("syslogVer", *v)?;
        }
    }

    encode_nv_pair_list(enc, throttle, "additionalFields", &fields.additional_fields);
    enc.end_object();
    Ok(())
}

fn encode_other(enc: &mut JsonEncoder, fields: &OtherFields, _throttle: Option<&ThrottleSpec>) -> Result<()> {
    enc.named_object("otherFields");
    if !fields.name_value_pairs.is_empty() {
        enc.named_array("nameValuePairs");
        for pair in &fields.name_value_pairs {
            enc.start_object();
            enc.kv_string("name", &pair.name, MAX_STRING_CHARS)?;
            enc.kv_string("value", &pair.value, MAX_STRING_CHARS)?;
            enc.end_object();
        }
        enc.end_array();
    }
    enc.end_object();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::model::domain::fault::{FaultFields, Severity, SourceType, VfStatus};
    use crate::model::domain::heartbeat::HeartbeatFields;
    use crate::model::event::Event;
    use crate::model::header::{Domain, EventContext, Priority, SchemaVersion};
    use crate::platform::PlatformMetadata;
    use crate::throttle::ThrottleRegistry;
    use std::sync::Arc;

    fn ctx_with_clock(micros: u64) -> EventContext {
        EventContext::with_clock(
            PlatformMetadata {
                reporting_entity_name: "vm-name".into(),
                reporting_entity_id: Some("vm-uuid".into()),
                source_name: "vm-name".into(),
                source_id: Some("vm-uuid".into()),
                functional_role: "UNIT TEST".into(),
            },
            Arc::new(FixedClock::new(micros)),
        )
    }

    /// Scenario S1 (`spec.md` §8): heartbeat baseline envelope.
    #[test]
    fn s1_heartbeat_baseline_envelope() {
        let ctx = ctx_with_clock(1_000_002);
        ctx.set_next_sequence(121);
        let mut header = ctx.new_header(
            Domain::Heartbeat,
            "Autonomous heartbeat",
            Priority::Normal,
            SchemaVersion::new(1, Some(2)),
        );
        let fields = HeartbeatFields::new();
        // `event_id` already defaults to the sequence number (§3.1); the C
        // source's `evel_new_heartbeat` additionally stamps a default
        // `eventType`, which the factory normally does — reproduced here
        // via `force` since this test builds the header directly.
        header.event_type.force("Autonomous heartbeat".to_string());

        let event = Event::Heartbeat(header, fields);
        let registry = ThrottleRegistry::new();
        let bytes = encode_event(&event, &registry).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let header_json = &json["event"]["commonEventHeader"];
        assert_eq!(header_json["domain"], "heartbeat");
        assert_eq!(header_json["eventId"], "121");
        assert_eq!(header_json["functionalRole"], "UNIT TEST");
        assert_eq!(header_json["lastEpochMicrosec"], 1_000_002);
        assert_eq!(header_json["priority"], "Normal");
        assert_eq!(header_json["sequence"], 121);
        assert_eq!(header_json["startEpochMicrosec"], 1_000_002);
        assert_eq!(header_json["version"], 1.2);
        assert_eq!(header_json["eventType"], "Autonomous heartbeat");
        assert_eq!(header_json["reportingEntityId"], "vm-uuid");
        assert_eq!(header_json["sourceId"], "vm-uuid");
    }

    /// Scenario S2 (`spec.md` §8): fault additional-info throttling.
    #[test]
    fn s2_fault_additional_info_throttling() {
        let ctx = ctx_with_clock(1);
        let header = ctx.new_header(Domain::Fault, "Fault", Priority::Normal, SchemaVersion::new(1, Some(2)));
        let mut fields = FaultFields::new(
            "condition",
            "problem",
            Severity::Major,
            SourceType::Vm,
            VfStatus::Active,
        );
        fields.set_alarm_interface_a("eth0");
        fields.set_event_type("some type");
        for i in 1..=4 {
            fields.add_additional_info(format!("name{i}"), format!("value{i}"));
        }

        let registry = ThrottleRegistry::new();
        let mut spec = ThrottleSpec::new();
        spec.suppress_field("alarmInterfaceA");
        spec.suppress_field("eventType");
        spec.suppress_nv_pair("alarmAdditionalInformation", "name3");
        spec.suppress_nv_pair("alarmAdditionalInformation", "name4");
        registry.apply(Domain::Fault, spec);

        let event = Event::Fault(header, fields);
        let bytes = encode_event(&event, &registry).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let fault = &json["event"]["faultFields"];
        assert!(fault.get("alarmInterfaceA").is_none());
        assert!(fault.get("eventType").is_none());
        let info = fault["alarmAdditionalInformation"].as_array().unwrap();
        assert_eq!(info.len(), 2);
        assert_eq!(info[0]["name"], "name1");
        assert_eq!(info[1]["name"], "name2");
    }

    /// Scenario S3 (`spec.md` §8): CPU-usage container is fully rewound
    /// when every identifier present is suppressed.
    #[test]
    fn s3_measurement_cpu_array_rewound_when_emptied() {
        let ctx = ctx_with_clock(1);
        let header = ctx.new_header(
            Domain::Measurement,
            "Measurement",
            Priority::Normal,
            SchemaVersion::new(1, Some(2)),
        );
        let mut fields = MeasurementFields::new(20.0).unwrap();
        fields.add_cpu_usage(crate::model::domain::measurement::CpuUsage::new("cpu0", 50.0));

        let registry = ThrottleRegistry::new();
        let mut spec = ThrottleSpec::new();
        spec.suppress_nv_pair("cpuUsageArray", "cpu0");
        registry.apply(Domain::Measurement, spec);

        let event = Event::Measurement(header, fields);
        let bytes = encode_event(&event, &registry).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(!text.contains("cpuUsageArray"), "got: {text}");
    }

    #[test]
    fn escaping_quotes_and_backslashes() {
        let ctx = ctx_with_clock(1);
        let header = ctx.new_header(Domain::Other, "Other", Priority::Normal, SchemaVersion::new(1, None));
        let mut fields = OtherFields::new();
        fields.add_field("k", "has \"quote\" and \\backslash");
        let registry = ThrottleRegistry::new();
        let event = Event::Other(header, fields);
        let bytes = encode_event(&event, &registry).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(r#"has \"quote\" and \\backslash"#));
    }

    /// Property 5 (`spec.md` §8): encoding the same event under the same
    /// throttle spec twice yields byte-identical output.
    #[test]
    fn suppression_is_idempotent() {
        let ctx = ctx_with_clock(42);
        let header = ctx.new_header(Domain::Fault, "Fault", Priority::Normal, SchemaVersion::new(1, Some(2)));
        let mut fields = FaultFields::new(
            "condition",
            "problem",
            Severity::Minor,
            SourceType::Host,
            VfStatus::Idle,
        );
        fields.add_additional_info("a", "1");
        let registry = ThrottleRegistry::new();
        let mut spec = ThrottleSpec::new();
        spec.suppress_field("eventType");
        registry.apply(Domain::Fault, spec);

        let event = Event::Fault(header, fields);
        let first = encode_event(&event, &registry).unwrap();
        let second = encode_event(&event, &registry).unwrap();
        assert_eq!(first, second);
    }
}
