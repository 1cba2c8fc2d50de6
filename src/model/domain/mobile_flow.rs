//! Mobile-flow domain (`spec.md` §3.3). Wire key: `mobileFlowFields`. One
//! GTP-U flow's endpoint addressing plus its accumulated transport-layer
//! statistics and a grab-bag of optional radio/session identifiers,
//! mirroring `evel_mobile_flow.c`'s field list.

use crate::option::Field;

use super::NameValuePair;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowDirection {
    Inbound,
    Outbound,
}

impl FlowDirection {
    pub fn wire_name(self) -> &'static str {
        match self {
            FlowDirection::Inbound => "Inbound",
            FlowDirection::Outbound => "Outbound",
        }
    }
}

/// `tcpFlagCountList` entry — one histogram bucket over the GTP flow's
/// TCP control flags.
#[derive(Debug, Clone, Copy)]
pub struct TcpFlagCount {
    pub tcp_flag: &'static str,
    pub count: i64,
}

/// `qciCosCountList` entry — packet count at a given QCI/CoS class.
#[derive(Debug, Clone)]
pub struct QciCosCount {
    pub qci_cos: String,
    pub count: i64,
}

/// The mandatory `gtpPerFlowMetrics` sub-object (§3.3: "~30 GTP per-flow
/// metrics"). Every field here is required by the collector schema even
/// though individual VNFs may report zero for metrics they don't track.
#[derive(Debug, Clone)]
pub struct GtpPerFlowMetrics {
    pub avg_bit_error_rate: f64,
    pub avg_packet_delay_variation: f64,
    pub avg_packet_latency: f64,
    pub avg_receive_throughput: f64,
    pub avg_transmit_throughput: f64,
    pub flow_activation_epoch: u64,
    pub flow_activation_microsec: u64,
    pub flow_deactivation_epoch: u64,
    pub flow_deactivation_microsec: u64,
    pub flow_deactivation_time: u64,
    pub flow_status: String,
    pub max_packet_delay_variation: f64,
    pub num_activation_failures: i64,
    pub num_bit_errors: i64,
    pub num_bytes_received: i64,
    pub num_bytes_transmitted: i64,
    pub num_dropped_packets: i64,
    pub num_l7_bytes_received: i64,
    pub num_l7_bytes_transmitted: i64,
    pub num_lost_packets: i64,
    pub num_out_of_order_packets: i64,
    pub num_packet_errors: i64,
    pub num_packets_received_excl_retrans: i64,
    pub num_packets_received_incl_retrans: i64,
    pub num_packets_transmitted_incl_retrans: i64,
    pub num_retransmitted_packets: i64,
    pub num_timeout_retransmitted_packets: i64,
    pub num_tunneled_l7_bytes_received: i64,
    pub round_trip_time: i64,
    pub time_to_first_byte: i64,
    pub tcp_flag_count_list: Vec<TcpFlagCount>,
    pub qci_cos_count_list: Vec<QciCosCount>,
    pub dur_connection_failed_status: Field<String>,
    pub dur_tunnel_failed_status: Field<String>,
    pub ip_tos_count_list: Vec<(String, i64)>,
    pub large_packet_rtt: Field<i64>,
    pub large_packet_threshold: Field<f64>,
    pub max_receive_bit_rate: Field<i64>,
    pub max_transmit_bit_rate: Field<i64>,
}

impl GtpPerFlowMetrics {
    pub fn new(flow_status: impl Into<String>) -> Self {
        GtpPerFlowMetrics {
            avg_bit_error_rate: 0.0,
            avg_packet_delay_variation: 0.0,
            avg_packet_latency: 0.0,
            avg_receive_throughput: 0.0,
            avg_transmit_throughput: 0.0,
            flow_activation_epoch: 0,
            flow_activation_microsec: 0,
            flow_deactivation_epoch: 0,
            flow_deactivation_microsec: 0,
            flow_deactivation_time: 0,
            flow_status: flow_status.into(),
            max_packet_delay_variation: 0.0,
            num_activation_failures: 0,
            num_bit_errors: 0,
            num_bytes_received: 0,
            num_bytes_transmitted: 0,
            num_dropped_packets: 0,
            num_l7_bytes_received: 0,
            num_l7_bytes_transmitted: 0,
            num_lost_packets: 0,
            num_out_of_order_packets: 0,
            num_packet_errors: 0,
            num_packets_received_excl_retrans: 0,
            num_packets_received_incl_retrans: 0,
            num_packets_transmitted_incl_retrans: 0,
            num_retransmitted_packets: 0,
            num_timeout_retransmitted_packets: 0,
            num_tunneled_l7_bytes_received: 0,
            round_trip_time: 0,
            time_to_first_byte: 0,
            tcp_flag_count_list: Vec::new(),
            qci_cos_count_list: Vec::new(),
            dur_connection_failed_status: Field::unset(),
            dur_tunnel_failed_status: Field::unset(),
            ip_tos_count_list: Vec::new(),
            large_packet_rtt: Field::unset(),
            large_packet_threshold: Field::unset(),
            max_receive_bit_rate: Field::unset(),
            max_transmit_bit_rate: Field::unset(),
        }
    }
}

/// `mobileFlowFields` (§3.3). Endpoint addresses/ports and direction are
/// mandatory; the ~20 radio/session identifiers (CID, ECGI, RAC, SAC,
/// IMSI, IMEI, MSISDN, APN, ...) are all optional per the collector
/// schema, since VNFs running on different RAN generations populate
/// disjoint subsets.
#[derive(Debug, Clone)]
pub struct MobileFlowFields {
    pub flow_direction: FlowDirection,
    pub gtp_protocol_type: String,
    pub gtp_version: String,
    pub http_header: Field<String>,
    pub ip_protocol_type: String,
    pub ip_version: String,
    pub other_endpoint_ip_address: String,
    pub other_endpoint_port: i64,
    pub other_functional_role: String,
    pub reporting_endpoint_ip_address: String,
    pub reporting_endpoint_port: i64,
    pub flow_metrics: GtpPerFlowMetrics,
    pub application_type: Field<String>,
    pub app_protocol_type: Field<String>,
    pub app_protocol_version: Field<String>,
    pub cid: Field<String>,
    pub connection_type: Field<String>,
    pub ecgi: Field<String>,
    pub gtp_protocol_version: Field<String>,
    pub imei: Field<String>,
    pub imsi: Field<String>,
    pub lac: Field<String>,
    pub mcc: Field<String>,
    pub mnc: Field<String>,
    pub msisdn: Field<String>,
    pub other_function_role: Field<String>,
    pub rac: Field<String>,
    pub radio_access_technology: Field<String>,
    pub sac: Field<String>,
    pub sampling_algorithm: Field<i64>,
    pub tac: Field<String>,
    pub tunnel_id: Field<String>,
    pub vlan_id: Field<String>,
    pub additional_info: Vec<NameValuePair>,
}

impl MobileFlowFields {
    pub fn new(
        flow_direction: FlowDirection,
        gtp_protocol_type: impl Into<String>,
        gtp_version: impl Into<String>,
        ip_protocol_type: impl Into<String>,
        ip_version: impl Into<String>,
        other_endpoint_ip_address: impl Into<String>,
        other_endpoint_port: i64,
        other_functional_role: impl Into<String>,
        reporting_endpoint_ip_address: impl Into<String>,
        reporting_endpoint_port: i64,
        flow_metrics: GtpPerFlowMetrics,
    ) -> Self {
        MobileFlowFields {
            flow_direction,
            gtp_protocol_type: gtp_protocol_type.into(),
            gtp_version: gtp_version.into(),
            http_header: Field::unset(),
            ip_protocol_type: ip_protocol_type.into(),
            ip_version: ip_version.into(),
            other_endpoint_ip_address: other_endpoint_ip_address.into(),
            other_endpoint_port,
            other_functional_role: other_functional_role.into(),
            reporting_endpoint_ip_address: reporting_endpoint_ip_address.into(),
            reporting_endpoint_port,
            flow_metrics,
            application_type: Field::unset(),
            app_protocol_type: Field::unset(),
            app_protocol_version: Field::unset(),
            cid: Field::unset(),
            connection_type: Field::unset(),
            ecgi: Field::unset(),
            gtp_protocol_version: Field::unset(),
            imei: Field::unset(),
            imsi: Field::unset(),
            lac: Field::unset(),
            mcc: Field::unset(),
            mnc: Field::unset(),
            msisdn: Field::unset(),
            other_function_role: Field::unset(),
            rac: Field::unset(),
            radio_access_technology: Field::unset(),
            sac: Field::unset(),
            sampling_algorithm: Field::unset(),
            tac: Field::unset(),
            tunnel_id: Field::unset(),
            vlan_id: Field::unset(),
            additional_info: Vec::new(),
        }
    }

    pub fn add_additional_info(&mut self, name: impl Into<String>, value: impl Into<String>) {
        super::push_info(&mut self.additional_info, name, value);
    }
}
