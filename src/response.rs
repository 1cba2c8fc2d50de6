//! Response parser / command dispatcher (C7, `spec.md` §4.7). Ingests a
//! collector reply of shape `{"commandList": [{"command": {"commandType":
//! ..., ...}}, ...]}` and drives `commandType`-specific updates to the
//! [`ThrottleRegistry`] (C4), or produces a "provide throttling state"
//! reply to post back.
//!
//! Grounded on `original_source/vnfs/VES5.0/evel/evel-library/code/
//! evel_library/evel_throttle.h`'s `EVEL_JSON_COMMAND_STATE` state machine
//! (`start -> commandList -> commandListEntry -> command -> spec ->
//! fieldNames | pairsList -> pairsListEntry -> nvPairNames`), reimplemented
//! as a typed walk over `serde_json::Value` rather than a byte-offset token
//! stack (`spec.md` §9's "JSMN-style token stream" is the opaque tokenizer
//! collaborator named in §1; `serde_json` plays that role here). Unknown
//! keys at any depth are skipped rather than rejected, matching the
//! spec's "Unknown keys at any depth advance past their value without
//! error" contract.

use serde_json::{json, Value};

use crate::model::header::Domain;
use crate::throttle::{ThrottleRegistry, ThrottleSpec};

/// Parses one collector response body and applies any `commandList`
/// entries to `registry`. Returns the JSON bytes of a "provide throttling
/// state" reply if the collector asked for one — the caller (C6) is
/// responsible for POSTing that to the throttling-state URL on the same
/// connection (`spec.md` §4.6 step 5).
///
/// Malformed documents, and unrecognized `commandType`s, are logged and
/// otherwise ignored (`spec.md` §7: "Parse error (response): logged,
/// command ignored; connection remains usable").
pub fn handle_response(body: &[u8], registry: &ThrottleRegistry) -> Option<Vec<u8>> {
    let doc: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "response parse error: not valid JSON");
            return None;
        }
    };

    let commands = match doc.get("commandList").and_then(Value::as_array) {
        Some(list) => list,
        None => {
            tracing::debug!("response had no commandList, nothing to dispatch");
            return None;
        }
    };

    let mut provide_state_requested = false;
    for entry in commands {
        let Some(command) = entry.get("command") else {
            tracing::warn!("commandList entry missing \"command\" key, skipping");
            continue;
        };
        let Some(command_type) = command.get("commandType").and_then(Value::as_str) else {
            tracing::warn!("command missing \"commandType\" string, skipping");
            continue;
        };
        match command_type {
            "measurementIntervalChange" => apply_measurement_interval_change(command, registry),
            "throttlingSpecification" => apply_throttling_specification(command, registry),
            "provideThrottlingState" => provide_state_requested = true,
            other => tracing::info!(command_type = other, "ignoring unrecognized commandType"),
        }
    }

    if provide_state_requested {
        Some(serde_json::to_vec(&build_throttling_state(registry)).unwrap_or_default())
    } else {
        None
    }
}

fn apply_measurement_interval_change(command: &Value, registry: &ThrottleRegistry) {
    match command.get("measurementInterval").and_then(Value::as_u64) {
        Some(seconds) if seconds > 0 => {
            registry.set_measurement_interval(Some(seconds as u32));
        }
        _ => tracing::warn!("measurementIntervalChange missing a positive measurementInterval"),
    }
}

fn apply_throttling_specification(command: &Value, registry: &ThrottleRegistry) {
    let Some(spec_doc) = command.get("eventDomainThrottleSpecification") else {
        tracing::warn!("throttlingSpecification missing eventDomainThrottleSpecification");
        return;
    };
    let Some(domain_name) = spec_doc.get("eventDomain").and_then(Value::as_str) else {
        tracing::warn!("eventDomainThrottleSpecification missing eventDomain");
        return;
    };
    let Some(domain) = Domain::from_throttle_name(domain_name) else {
        tracing::info!(domain = domain_name, "ignoring unknown event-domain string");
        return;
    };

    let suppressed_fields = spec_doc
        .get("suppressedFieldNames")
        .and_then(Value::as_array);
    let pairs_list = spec_doc
        .get("suppressedNvPairsList")
        .and_then(Value::as_array);

    // "if neither suppression list is present, clears the domain's spec"
    // (spec.md §4.7).
    if suppressed_fields.is_none() && pairs_list.is_none() {
        registry.clear(domain);
        return;
    }

    let mut spec = ThrottleSpec::new();
    if let Some(fields) = suppressed_fields {
        for name in fields.iter().filter_map(Value::as_str) {
            spec.suppress_field(name);
        }
    }
    if let Some(pairs) = pairs_list {
        for entry in pairs {
            let Some(container) = entry.get("nvPairFieldName").and_then(Value::as_str) else {
                continue;
            };
            let Some(names) = entry.get("suppressedNvPairNames").and_then(Value::as_array) else {
                continue;
            };
            for name in names.iter().filter_map(Value::as_str) {
                spec.suppress_nv_pair(container, name);
            }
        }
    }
    registry.apply(domain, spec);
}

/// Builds the `provideThrottlingState` reply (`spec.md` §4.7). Mode is
/// `"throttled"` iff any of the nine domains currently carries a
/// non-empty spec; the per-domain list is omitted entirely when
/// unthrottled, matching scenario S5.
fn build_throttling_state(registry: &ThrottleRegistry) -> Value {
    let mut domain_specs = Vec::new();
    for domain in Domain::EXTERNAL_DOMAINS {
        if let Some(spec) = registry.get(domain) {
            domain_specs.push(encode_domain_spec(domain, &spec));
        }
    }

    if domain_specs.is_empty() {
        json!({ "eventThrottlingState": { "eventThrottlingMode": "normal" } })
    } else {
        json!({
            "eventThrottlingState": {
                "eventThrottlingMode": "throttled",
                "eventDomainThrottleSpecificationList": domain_specs,
            }
        })
    }
}

fn encode_domain_spec(domain: Domain, spec: &ThrottleSpec) -> Value {
    let mut obj = serde_json::Map::new();
    obj.insert("eventDomain".into(), json!(domain.throttle_name()));

    if !spec.suppressed_fields.is_empty() {
        let mut names: Vec<&str> = spec.suppressed_fields.iter().map(String::as_str).collect();
        names.sort_unstable();
        obj.insert("suppressedFieldNames".into(), json!(names));
    }

    if !spec.suppressed_nv_pair_names.is_empty() {
        let mut by_container: std::collections::BTreeMap<&str, Vec<&str>> = std::collections::BTreeMap::new();
        for (container, name) in &spec.suppressed_nv_pair_names {
            by_container.entry(container.as_str()).or_default().push(name.as_str());
        }
        let pairs_list: Vec<Value> = by_container
            .into_iter()
            .map(|(container, mut names)| {
                names.sort_unstable();
                json!({
                    "nvPairFieldName": container,
                    "suppressedNvPairNames": names,
                })
            })
            .collect();
        obj.insert("suppressedNvPairsList".into(), json!(pairs_list));
    }

    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scenario S4 (`spec.md` §8): measurement interval command ingestion.
    #[test]
    fn s4_measurement_interval_change_updates_registry() {
        let registry = ThrottleRegistry::new();
        let body = br#"{"commandList":[{"command":{"commandType":"measurementIntervalChange","measurementInterval":60}}]}"#;
        let reply = handle_response(body, &registry);
        assert!(reply.is_none());
        assert_eq!(registry.measurement_interval(), Some(60));
    }

    /// Scenario S5 (`spec.md` §8), unthrottled branch: "normal" mode with
    /// no per-domain list at all.
    #[test]
    fn s5_provide_state_normal_when_unthrottled() {
        let registry = ThrottleRegistry::new();
        let body = br#"{"commandList":[{"command":{"commandType":"provideThrottlingState"}}]}"#;
        let reply = handle_response(body, &registry).expect("provide-state reply");
        let json: Value = serde_json::from_slice(&reply).unwrap();
        assert_eq!(json, json!({"eventThrottlingState": {"eventThrottlingMode": "normal"}}));
    }

    /// Scenario S5 (`spec.md` §8), throttled branch.
    #[test]
    fn s5_provide_state_lists_throttled_domains() {
        let registry = ThrottleRegistry::new();
        let mut spec = ThrottleSpec::new();
        spec.suppress_field("alarmInterfaceA");
        registry.apply(Domain::Fault, spec);

        let body = br#"{"commandList":[{"command":{"commandType":"provideThrottlingState"}}]}"#;
        let reply = handle_response(body, &registry).expect("provide-state reply");
        let json: Value = serde_json::from_slice(&reply).unwrap();
        assert_eq!(
            json,
            json!({
                "eventThrottlingState": {
                    "eventThrottlingMode": "throttled",
                    "eventDomainThrottleSpecificationList": [
                        {"eventDomain": "fault", "suppressedFieldNames": ["alarmInterfaceA"]}
                    ]
                }
            })
        );
    }

    #[test]
    fn throttling_specification_with_no_lists_clears_domain() {
        let registry = ThrottleRegistry::new();
        let mut spec = ThrottleSpec::new();
        spec.suppress_field("x");
        registry.apply(Domain::Fault, spec);

        let body = br#"{"commandList":[{"command":{"commandType":"throttlingSpecification","eventDomainThrottleSpecification":{"eventDomain":"fault"}}}]}"#;
        handle_response(body, &registry);
        assert!(registry.get(Domain::Fault).is_none());
    }

    #[test]
    fn throttling_specification_builds_nv_pair_suppression() {
        let registry = ThrottleRegistry::new();
        let body = br#"{"commandList":[{"command":{"commandType":"throttlingSpecification","eventDomainThrottleSpecification":{
            "eventDomain":"fault",
            "suppressedNvPairsList":[{"nvPairFieldName":"alarmAdditionalInformation","suppressedNvPairNames":["name3","name4"]}]
        }}}]}"#;
        handle_response(body, &registry);
        let spec = registry.get(Domain::Fault).unwrap();
        assert!(spec.is_nv_pair_suppressed("alarmAdditionalInformation", "name3"));
        assert!(spec.is_nv_pair_suppressed("alarmAdditionalInformation", "name4"));
        assert!(!spec.is_nv_pair_suppressed("alarmAdditionalInformation", "name1"));
    }

    #[test]
    fn unknown_domain_name_is_ignored() {
        let registry = ThrottleRegistry::new();
        let body = br#"{"commandList":[{"command":{"commandType":"throttlingSpecification","eventDomainThrottleSpecification":{
            "eventDomain":"notARealDomain","suppressedFieldNames":["x"]
        }}}]}"#;
        let reply = handle_response(body, &registry);
        assert!(reply.is_none());
    }

    #[test]
    fn malformed_json_is_swallowed() {
        let registry = ThrottleRegistry::new();
        assert!(handle_response(b"not json", &registry).is_none());
    }

    #[test]
    fn unknown_command_type_is_ignored_without_error() {
        let registry = ThrottleRegistry::new();
        let body = br#"{"commandList":[{"command":{"commandType":"somethingNew","foo":"bar"}}]}"#;
        assert!(handle_response(body, &registry).is_none());
    }
}
