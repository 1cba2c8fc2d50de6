//! Service domain (`spec.md` §3.3). Wire key: `serviceEventsFields`.
//! Models a single VoIP/media call leg: codec negotiation, mid-call RTCP
//! sampling, and end-of-call voice-quality metrics as optional sub-objects,
//! mirroring `evel_service.c`'s three-phase structure.

use crate::option::Field;

use super::NameValuePair;

/// `codecSelected`/`codecSelectedTranscoding` pairing (§3.3: "codec
/// selected, transcoding").
#[derive(Debug, Clone)]
pub struct CodecSelection {
    pub codec_selected: String,
    pub codec_selected_transcoding: bool,
}

/// Mid-call RTCP sample (§3.3: "mid-call RTCP").
#[derive(Debug, Clone, Default)]
pub struct MidCallRtcp {
    pub jitter: Field<i64>,
    pub packets_lost: Field<i64>,
    pub round_trip_delay_ms: Field<i64>,
}

/// End-of-call voice quality metrics (§3.3: "end-of-call VQM").
#[derive(Debug, Clone, Default)]
pub struct EndOfCallVqm {
    pub adjacency_name: Field<String>,
    pub mos_cqe: Field<f64>,
    pub packets_lost: Field<i64>,
    pub r_factor: Field<i64>,
}

/// `serviceEventsFields` (§3.3). The `(instance_id, correlator)` pair is
/// mandatory; everything else optional.
#[derive(Debug, Clone)]
pub struct ServiceFields {
    pub service_instance_id: String,
    pub correlator: String,
    pub additional_info: Vec<NameValuePair>,
    pub codec_selection: Field<CodecSelection>,
    pub mid_call_rtcp: Field<MidCallRtcp>,
    pub end_of_call_vqm: Field<EndOfCallVqm>,
}

impl ServiceFields {
    pub fn new(service_instance_id: impl Into<String>, correlator: impl Into<String>) -> Self {
        ServiceFields {
            service_instance_id: service_instance_id.into(),
            correlator: correlator.into(),
            additional_info: Vec::new(),
            codec_selection: Field::unset(),
            mid_call_rtcp: Field::unset(),
            end_of_call_vqm: Field::unset(),
        }
    }

    pub fn set_codec_selection(&mut self, codec_selected: impl Into<String>, transcoding: bool) {
        self.codec_selection.set(
            CodecSelection {
                codec_selected: codec_selected.into(),
                codec_selected_transcoding: transcoding,
            },
            "codecSelected",
        );
    }

    pub fn set_end_of_call_vqm(&mut self, vqm: EndOfCallVqm) {
        self.end_of_call_vqm.set(vqm, "endOfCallVqmSummaries");
    }

    pub fn add_additional_info(&mut self, name: impl Into<String>, value: impl Into<String>) {
        super::push_info(&mut self.additional_info, name, value);
    }
}
