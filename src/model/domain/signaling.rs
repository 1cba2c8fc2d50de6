//! Signaling domain (`spec.md` §3.3). Wire key: `signalingFields`. Models
//! a single SIP/signaling exchange between the VNF and a local/remote
//! endpoint, mirroring `evel_signaling.c`.

use crate::option::Field;

use super::NameValuePair;

#[derive(Debug, Clone)]
pub struct SignalingFields {
    pub vendor_vnfname_field: String,
    pub vnfmodule_name: String,
    pub vnf_name: String,
    pub correlator: String,
    pub local_ip_address: Field<String>,
    pub local_port: Field<String>,
    pub remote_ip_address: Field<String>,
    pub remote_port: Field<String>,
    pub compressed_sip: Field<String>,
    pub summary_sip: Field<String>,
    pub additional_info: Vec<NameValuePair>,
}

impl SignalingFields {
    pub fn new(
        vendor_vnfname_field: impl Into<String>,
        vnfmodule_name: impl Into<String>,
        vnf_name: impl Into<String>,
        correlator: impl Into<String>,
    ) -> Self {
        SignalingFields {
            vendor_vnfname_field: vendor_vnfname_field.into(),
            vnfmodule_name: vnfmodule_name.into(),
            vnf_name: vnf_name.into(),
            correlator: correlator.into(),
            local_ip_address: Field::unset(),
            local_port: Field::unset(),
            remote_ip_address: Field::unset(),
            remote_port: Field::unset(),
            compressed_sip: Field::unset(),
            summary_sip: Field::unset(),
            additional_info: Vec::new(),
        }
    }

    pub fn set_local_endpoint(&mut self, ip: impl Into<String>, port: impl Into<String>) {
        self.local_ip_address.set(ip.into(), "localIpAddress");
        self.local_port.set(port.into(), "localPort");
    }

    pub fn set_remote_endpoint(&mut self, ip: impl Into<String>, port: impl Into<String>) {
        self.remote_ip_address.set(ip.into(), "remoteIpAddress");
        self.remote_port.set(port.into(), "remotePort");
    }

    pub fn add_additional_info(&mut self, name: impl Into<String>, value: impl Into<String>) {
        super::push_info(&mut self.additional_info, name, value);
    }
}
