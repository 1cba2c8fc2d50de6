//! Report domain (`spec.md` §3.3). Wire key: `reportFields`. Carries a
//! reporting interval plus the same additional-measurements grouping as
//! the measurement domain, per the collector schema's shared
//! `MEASUREMENT_GROUP` type.

use crate::option::Field;

use super::measurement::MeasurementGroup;

#[derive(Debug, Clone)]
pub struct ReportFields {
    pub reporting_entity_name: Field<String>,
    pub reporting_entity_id: Field<String>,
    pub measurement_interval: f64,
    pub feature_usage_array: Vec<(String, i64)>,
    pub measurement_groups: Vec<MeasurementGroup>,
}

impl ReportFields {
    pub fn new(measurement_interval: f64) -> Option<Self> {
        if measurement_interval < 0.0 {
            return None;
        }
        Some(ReportFields {
            reporting_entity_name: Field::unset(),
            reporting_entity_id: Field::unset(),
            measurement_interval,
            feature_usage_array: Vec::new(),
            measurement_groups: Vec::new(),
        })
    }

    pub fn add_feature_usage(&mut self, feature_identifier: impl Into<String>, count: i64) {
        self.feature_usage_array.push((feature_identifier.into(), count));
    }
}
