//! Transport adapter (C8, `spec.md` §1, §4.6, §6.1): the "POST-with-response"
//! boundary the core consumes. The spec treats the HTTP client as an
//! external collaborator; this module is the trait seam plus one concrete
//! production adapter so the crate can be exercised end-to-end, mirroring
//! `N3mes1s-sentra`'s use of `reqwest` for the same "the core needs *a*
//! transport, not a hand-rolled one" reason (`SPEC_FULL.md` §6).

use std::time::Duration;

use crate::error::{Result, VelError};

/// Credentials forwarded to the transport for HTTP basic auth (`spec.md`
/// §6.1: "HTTP basic authentication is used when credentials are
/// configured"). The core never inspects or stores these beyond passing
/// them through.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// One blocking POST-with-response exchange (`spec.md` §1: "the core
/// consumes a 'POST-with-response' transport interface"). Implementations
/// own connection reuse/TLS/retries-below-this-layer; the core never
/// retries a failed POST itself (`spec.md` §7: "no retry queue").
pub trait Transport: Send + Sync + 'static {
    /// POSTs `body` (already-encoded JSON) to `url` with `content-type:
    /// application/json`, the `Expect:` header suppressed (`spec.md`
    /// §6.1), and `auth` applied if present. Returns the response body on
    /// any 2xx status; a non-2xx status or I/O failure is a
    /// [`VelError::Transport`] (`spec.md` §7: "logged, event dropped; no
    /// retry").
    fn post_json(&self, url: &str, body: Vec<u8>, auth: Option<&BasicAuth>) -> Result<Vec<u8>>;
}

/// Blocking `reqwest`-backed production adapter. One `reqwest::blocking::
/// Client` is reused across every POST so the underlying connection is
/// kept alive (`spec.md` §4.8: "persistent connection"), matching the C
/// library's single long-lived libcurl easy handle.
#[cfg(feature = "reqwest-transport")]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "reqwest-transport")]
impl ReqwestTransport {
    pub fn new(verbosity: TransportVerbosity) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            // The C library explicitly suppresses `Expect: 100-continue`
            // (`spec.md` §6.1); `reqwest` never sends it on its own, but the
            // empty header here documents and pins that behavior.
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(reqwest::header::EXPECT, reqwest::header::HeaderValue::from_static(""));
                headers
            });
        if verbosity.is_verbose() {
            tracing::debug!("reqwest transport configured with verbose logging");
        }
        builder = builder.pool_idle_timeout(Duration::from_secs(90));
        let client = builder
            .build()
            .map_err(|e| VelError::Transport(Box::new(e)))?;
        Ok(ReqwestTransport { client })
    }
}

#[cfg(feature = "reqwest-transport")]
impl Transport for ReqwestTransport {
    fn post_json(&self, url: &str, body: Vec<u8>, auth: Option<&BasicAuth>) -> Result<Vec<u8>> {
        let mut req = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(auth) = auth {
            req = req.basic_auth(&auth.username, Some(&auth.password));
        }
        let response = req.send().map_err(|e| VelError::Transport(Box::new(e)))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .map_err(|e| VelError::Transport(Box::new(e)))?;
        if !status.is_success() {
            return Err(VelError::Transport(Box::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("collector responded with HTTP {status}"),
            ))));
        }
        Ok(bytes.to_vec())
    }
}

/// Verbosity knob threaded through from `VelConfig` to the transport
/// adapter (`spec.md` §4.8: "configurable verbosity").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportVerbosity {
    #[default]
    Normal,
    Verbose,
}

impl TransportVerbosity {
    pub fn is_verbose(self) -> bool {
        matches!(self, TransportVerbosity::Verbose)
    }
}

/// Test/demo support: an in-memory `Transport` that records every POST and
/// plays back a scripted response body (`SPEC_FULL.md` §6: "a
/// `MockTransport` ... backs the test scenarios in §8"). Lives behind
/// `cfg(any(test, feature = "test-support"))` so integration tests in
/// `tests/` can use it without pulling it into production builds.
#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// One recorded POST: the target URL and the exact bytes sent.
    #[derive(Debug, Clone)]
    pub struct RecordedPost {
        pub url: String,
        pub body: Vec<u8>,
    }

    #[derive(Default)]
    struct State {
        posts: Vec<RecordedPost>,
        /// Responses returned in FIFO order, one per `post_json` call,
        /// keyed by call index; falls back to `default_response` once
        /// exhausted.
        scripted_responses: std::collections::VecDeque<Result<Vec<u8>>>,
        default_response: Vec<u8>,
    }

    /// A `Transport` that never touches the network: every POST is
    /// recorded, and responses are either scripted per-call or a fixed
    /// default (empty `commandList`, i.e. "no commands").
    pub struct MockTransport {
        state: Mutex<State>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            MockTransport {
                state: Mutex::new(State {
                    posts: Vec::new(),
                    scripted_responses: std::collections::VecDeque::new(),
                    default_response: b"{\"commandList\":[]}".to_vec(),
                }),
            }
        }

        /// Queues a response body returned on the next `post_json` call
        /// this transport hasn't already scripted a response for.
        pub fn push_response(&self, body: impl Into<Vec<u8>>) {
            self.state
                .lock()
                .unwrap()
                .scripted_responses
                .push_back(Ok(body.into()));
        }

        /// Queues a transport failure for the next `post_json` call.
        pub fn push_failure(&self, message: impl Into<String>) {
            let message = message.into();
            self.state.lock().unwrap().scripted_responses.push_back(Err(
                VelError::Transport(Box::new(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    message,
                ))),
            ));
        }

        pub fn posts(&self) -> Vec<RecordedPost> {
            self.state.lock().unwrap().posts.clone()
        }

        pub fn post_count(&self) -> usize {
            self.state.lock().unwrap().posts.len()
        }
    }

    impl Default for MockTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Transport for MockTransport {
        fn post_json(&self, url: &str, body: Vec<u8>, _auth: Option<&BasicAuth>) -> Result<Vec<u8>> {
            let mut state = self.state.lock().unwrap();
            state.posts.push(RecordedPost {
                url: url.to_string(),
                body,
            });
            if let Some(scripted) = state.scripted_responses.pop_front() {
                scripted
            } else {
                Ok(state.default_response.clone())
            }
        }
    }

    #[test]
    fn records_posts_in_call_order() {
        let transport = MockTransport::new();
        transport.post_json("http://a", b"1".to_vec(), None).unwrap();
        transport.post_json("http://b", b"2".to_vec(), None).unwrap();
        let posts = transport.posts();
        assert_eq!(posts[0].url, "http://a");
        assert_eq!(posts[1].url, "http://b");
    }

    #[test]
    fn scripted_failure_propagates() {
        let transport = MockTransport::new();
        transport.push_failure("boom");
        let err = transport.post_json("http://a", Vec::new(), None);
        assert!(err.is_err());
    }
}
