//! Measurement domain (`spec.md` §3.3). Wire key:
//! `measurementsForVfScalingFields`. Grounded on
//! `original_source/vnfs/VES/code/evel_library/evel_scaling_measurement.c`
//! for collection field names and checkpoint/rewind placement.

use crate::option::Field;

use super::NameValuePair;

/// CPU utilization sample (`cpuUsageArray` entries). Nine utilization
/// doubles plus the identifying name, matching
/// `evel_scaling_measurement.c`'s `percentUsage` plus the richer per-state
/// breakdown the VES schema carries.
#[derive(Debug, Clone)]
pub struct CpuUsage {
    pub cpu_identifier: String,
    pub percent_usage: f64,
    pub cpu_idle: Field<f64>,
    pub cpu_usage_interrupt: Field<f64>,
    pub cpu_usage_nice: Field<f64>,
    pub cpu_usage_soft_irq: Field<f64>,
    pub cpu_usage_steal: Field<f64>,
    pub cpu_usage_system: Field<f64>,
    pub cpu_usage_user: Field<f64>,
    pub cpu_wait: Field<f64>,
}

impl CpuUsage {
    pub fn new(cpu_identifier: impl Into<String>, percent_usage: f64) -> Self {
        CpuUsage {
            cpu_identifier: cpu_identifier.into(),
            percent_usage,
            cpu_idle: Field::unset(),
            cpu_usage_interrupt: Field::unset(),
            cpu_usage_nice: Field::unset(),
            cpu_usage_soft_irq: Field::unset(),
            cpu_usage_steal: Field::unset(),
            cpu_usage_system: Field::unset(),
            cpu_usage_user: Field::unset(),
            cpu_wait: Field::unset(),
        }
    }
}

/// `filesystemUsageArray` entry.
#[derive(Debug, Clone)]
pub struct FilesystemUsage {
    pub filesystem_name: String,
    pub block_configured: f64,
    pub block_iops: i64,
    pub block_used: f64,
    pub ephemeral_configured: f64,
    pub ephemeral_iops: i64,
    pub ephemeral_used: f64,
}

/// `latencyDistribution` bucket.
#[derive(Debug, Clone, Copy)]
pub struct LatencyBucket {
    pub low_end: Field<f64>,
    pub high_end: Field<f64>,
    pub count_in_the_bucket: i64,
}

/// `vNicUsageArray` entry — identifier, suspect-values flag, and delta /
/// accumulated packet and byte counters (`spec.md` §3.3: "up to 28
/// delta/accumulated counters").
#[derive(Debug, Clone, Default)]
pub struct VnicCounters {
    pub broadcast_packets_in: Field<i64>,
    pub broadcast_packets_out: Field<i64>,
    pub bytes_in: Field<i64>,
    pub bytes_out: Field<i64>,
    pub multicast_packets_in: Field<i64>,
    pub multicast_packets_out: Field<i64>,
    pub packets_in: Field<i64>,
    pub packets_out: Field<i64>,
    pub unicast_packets_in: Field<i64>,
    pub unicast_packets_out: Field<i64>,
}

#[derive(Debug, Clone)]
pub struct VnicUsage {
    pub vnic_identifier: String,
    pub values_are_suspect: bool,
    pub delta: VnicCounters,
    pub accumulated: VnicCounters,
}

impl VnicUsage {
    pub fn new(vnic_identifier: impl Into<String>, values_are_suspect: bool) -> Self {
        VnicUsage {
            vnic_identifier: vnic_identifier.into(),
            values_are_suspect,
            delta: VnicCounters::default(),
            accumulated: VnicCounters::default(),
        }
    }
}

/// `codecUsageArray` entry.
#[derive(Debug, Clone)]
pub struct CodecUsage {
    pub codec_identifier: String,
    pub number_in_use: i64,
}

/// `featureUsageArray` entry.
#[derive(Debug, Clone)]
pub struct FeatureUsage {
    pub feature_identifier: String,
    pub feature_utilization: i64,
}

/// One named group of the `additionalMeasurements` two-level structure
/// (`spec.md` §4.2: "an ordered list of named groups, each containing an
/// ordered list of (name,value) pairs; duplicate group names are not
/// merged"). Callers must search existing groups by name themselves before
/// inserting, same as the C library, to match its behavior faithfully.
#[derive(Debug, Clone)]
pub struct MeasurementGroup {
    pub name: String,
    pub measurements: Vec<NameValuePair>,
}

/// `errors` sub-object (`spec.md` §3.3).
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorCounters {
    pub receive_discards: i64,
    pub receive_errors: i64,
    pub transmit_discards: i64,
    pub transmit_errors: i64,
}

#[derive(Debug, Clone)]
pub struct MeasurementFields {
    pub measurement_interval: f64,
    pub cpu_usage: Vec<CpuUsage>,
    pub filesystem_usage: Vec<FilesystemUsage>,
    pub latency_distribution: Vec<LatencyBucket>,
    pub vnic_usage: Vec<VnicUsage>,
    pub codec_usage: Vec<CodecUsage>,
    pub feature_usage: Vec<FeatureUsage>,
    pub additional_measurements: Vec<MeasurementGroup>,
    pub aggregate_cpu_usage: Field<f64>,
    pub memory_configured: Field<f64>,
    pub memory_used: Field<f64>,
    pub request_rate: Field<i64>,
    pub mean_request_latency: Field<f64>,
    pub concurrent_sessions: Field<i64>,
    pub configured_entities: Field<i64>,
    pub media_ports_in_use: Field<i64>,
    pub vnfc_scaling_metric: Field<i64>,
    pub errors: Field<ErrorCounters>,
}

impl MeasurementFields {
    /// `measurement_interval` must be >= 0 (`spec.md` §3.3); the factory
    /// returns `None` on an out-of-range value, treated as a precondition
    /// violation by the caller (§7).
    pub fn new(measurement_interval: f64) -> Option<Self> {
        if measurement_interval < 0.0 {
            return None;
        }
        Some(MeasurementFields {
            measurement_interval,
            cpu_usage: Vec::new(),
            filesystem_usage: Vec::new(),
            latency_distribution: Vec::new(),
            vnic_usage: Vec::new(),
            codec_usage: Vec::new(),
            feature_usage: Vec::new(),
            additional_measurements: Vec::new(),
            aggregate_cpu_usage: Field::unset(),
            memory_configured: Field::unset(),
            memory_used: Field::unset(),
            request_rate: Field::unset(),
            mean_request_latency: Field::unset(),
            concurrent_sessions: Field::unset(),
            configured_entities: Field::unset(),
            media_ports_in_use: Field::unset(),
            vnfc_scaling_metric: Field::unset(),
            errors: Field::unset(),
        })
    }

    pub fn add_cpu_usage(&mut self, usage: CpuUsage) {
        self.cpu_usage.push(usage);
    }

    /// Finds an existing additional-measurement group by name, or creates
    /// one and returns a mutable reference to it. Mirrors the C library's
    /// "search before insert" behavior (`spec.md` §4.2) — duplicate group
    /// names are never merged automatically, only by explicit reuse here.
    pub fn measurement_group(&mut self, name: &str) -> &mut MeasurementGroup {
        if let Some(idx) = self.additional_measurements.iter().position(|g| g.name == name) {
            return &mut self.additional_measurements[idx];
        }
        self.additional_measurements.push(MeasurementGroup {
            name: name.to_string(),
            measurements: Vec::new(),
        });
        self.additional_measurements.last_mut().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_interval_rejected() {
        assert!(MeasurementFields::new(-1.0).is_none());
    }

    #[test]
    fn duplicate_group_names_are_not_merged_unless_reused_explicitly() {
        let mut fields = MeasurementFields::new(60.0).unwrap();
        fields.measurement_group("g1").measurements.push(NameValuePair::new("a", "1"));
        fields.additional_measurements.push(MeasurementGroup {
            name: "g1".to_string(),
            measurements: vec![NameValuePair::new("b", "2")],
        });
        assert_eq!(fields.additional_measurements.len(), 2);
    }
}
