//! Library configuration (`spec.md` §4.8, §6.3). `VelConfig` is a fixed,
//! typed struct rather than the teacher's generic key-value
//! `ConfigValue`/`ConfigMetadata` store — this crate's configuration
//! surface is small and schema-known, so a builder over concrete fields is
//! the better fit. The environment-variable override pattern (construct
//! from defaults, let `VEL_*` variables win) is grounded on
//! `N3mes1s-sentra/src/config.rs`.

use crate::transport::TransportVerbosity;

/// Collector connection parameters plus the knobs `initialize` needs
/// before it can build URLs and spawn the consumer thread (`spec.md` §4.8:
/// "`initialize(fqdn, port, path?, topic?, secure, username?, password?,
/// source_type, role, verbosity)`").
#[derive(Debug, Clone)]
pub struct VelConfig {
    pub collector_fqdn: String,
    pub collector_port: u16,
    pub path: Option<String>,
    pub topic: Option<String>,
    pub secure: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub source_type: String,
    pub role: String,
    pub verbosity: TransportVerbosity,
    /// Schema version used to build the event URL (`spec.md` §4.8:
    /// "`v{major}[.{minor}]`").
    pub schema_major: u32,
    pub schema_minor: Option<u32>,
    /// Ring-buffer capacity (`spec.md` §4.5: "Capacity is a configuration
    /// input (default small, e.g. 100)").
    pub ring_buffer_capacity: usize,
}

const DEFAULT_RING_BUFFER_CAPACITY: usize = 100;

impl VelConfig {
    /// Minimal builder: the collector address plus the two fields the
    /// wire schema requires of every event (`source_type`, `role`), and
    /// the crate's own sane defaults for everything else.
    pub fn new(collector_fqdn: impl Into<String>, collector_port: u16, source_type: impl Into<String>, role: impl Into<String>) -> Self {
        VelConfig {
            collector_fqdn: collector_fqdn.into(),
            collector_port,
            path: None,
            topic: None,
            secure: false,
            username: None,
            password: None,
            source_type: source_type.into(),
            role: role.into(),
            verbosity: TransportVerbosity::Normal,
            schema_major: 7,
            schema_minor: Some(1),
            ring_buffer_capacity: DEFAULT_RING_BUFFER_CAPACITY,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_verbosity(mut self, verbosity: TransportVerbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_schema_version(mut self, major: u32, minor: Option<u32>) -> Self {
        self.schema_major = major;
        self.schema_minor = minor;
        self
    }

    pub fn with_ring_buffer_capacity(mut self, capacity: usize) -> Self {
        self.ring_buffer_capacity = capacity;
        self
    }

    /// Applies `VEL_*` environment-variable overrides on top of whatever
    /// the builder already set, mirroring the teacher's "construct
    /// defaults, let the environment win" layering. Unset or
    /// unparsable variables leave the existing value untouched.
    pub fn apply_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("VEL_COLLECTOR_FQDN") {
            self.collector_fqdn = v;
        }
        if let Ok(v) = std::env::var("VEL_COLLECTOR_PORT") {
            if let Ok(port) = v.parse() {
                self.collector_port = port;
            }
        }
        if let Ok(v) = std::env::var("VEL_PATH") {
            self.path = Some(v);
        }
        if let Ok(v) = std::env::var("VEL_TOPIC") {
            self.topic = Some(v);
        }
        if let Ok(v) = std::env::var("VEL_SECURE") {
            self.secure = v == "1" || v.eq_ignore_ascii_case("true");
        }
        if let Ok(v) = std::env::var("VEL_USERNAME") {
            self.username = Some(v);
        }
        if let Ok(v) = std::env::var("VEL_PASSWORD") {
            self.password = Some(v);
        }
        if let Ok(v) = std::env::var("VEL_VERBOSITY") {
            self.verbosity = if v.eq_ignore_ascii_case("verbose") {
                TransportVerbosity::Verbose
            } else {
                TransportVerbosity::Normal
            };
        }
        if let Ok(v) = std::env::var("VEL_RING_BUFFER_CAPACITY") {
            if let Ok(capacity) = v.parse() {
                self.ring_buffer_capacity = capacity;
            }
        }
        self
    }

    /// Base URL scheme for both the event and throttling-state endpoints.
    fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }

    /// `{scheme}://{fqdn}:{port}[/path]/eventListener/v{major}[.{minor}][/topic]`
    /// (`spec.md` §4.8).
    pub fn event_url(&self) -> String {
        let mut url = format!("{}://{}:{}", self.scheme(), self.collector_fqdn, self.collector_port);
        if let Some(path) = &self.path {
            url.push('/');
            url.push_str(path.trim_matches('/'));
        }
        url.push_str("/eventListener/v");
        url.push_str(&self.schema_major.to_string());
        if let Some(minor) = self.schema_minor {
            url.push('.');
            url.push_str(&minor.to_string());
        }
        if let Some(topic) = &self.topic {
            url.push('/');
            url.push_str(topic.trim_matches('/'));
        }
        url
    }

    /// `{event-base}/clientThrottlingState` (`spec.md` §4.8).
    pub fn throttle_state_url(&self) -> String {
        format!("{}/clientThrottlingState", self.event_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_url_matches_spec_template() {
        let config = VelConfig::new("collector.example.com", 30000, "vnf", "unit-test")
            .with_path("vendor-event-listener")
            .with_topic("my-topic");
        assert_eq!(
            config.event_url(),
            "http://collector.example.com:30000/vendor-event-listener/eventListener/v7.1/my-topic"
        );
    }

    #[test]
    fn throttle_state_url_appends_suffix() {
        let config = VelConfig::new("collector.example.com", 30000, "vnf", "unit-test");
        assert_eq!(
            config.throttle_state_url(),
            "http://collector.example.com:30000/eventListener/v7.1/clientThrottlingState"
        );
    }

    #[test]
    fn secure_flag_switches_scheme() {
        let config = VelConfig::new("collector.example.com", 30000, "vnf", "unit-test").with_secure(true);
        assert!(config.event_url().starts_with("https://"));
    }

    #[test]
    fn minor_omitted_when_none() {
        let config = VelConfig::new("h", 1, "vnf", "role").with_schema_version(5, None);
        assert!(config.event_url().ends_with("/eventListener/v5"));
    }
}
