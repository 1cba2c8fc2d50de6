//! Vendor Event Listener (VES) client library.
//!
//! A VNF-side telemetry pipeline: producer threads build strongly-typed,
//! partially-optional event records (fault, measurement, mobile-flow,
//! heartbeat, state-change, syslog, signaling, report, and free-form
//! events); a single background consumer thread encodes each to the
//! collector's JSON schema, applies collector-driven per-domain field
//! suppression, and ships it over a persistent HTTP connection. A
//! bidirectional throttle-control channel lets the collector ask the
//! client to suppress individual fields or name/value pairs, or change the
//! measurement reporting interval.
//!
//! The top-level entry point is [`client::VelClient`]; build a
//! [`config::VelConfig`], supply a [`platform::PlatformMetadataProvider`]
//! and a [`transport::Transport`], and call
//! [`client::VelClient::initialize`].

pub mod clock;
pub mod client;
pub mod config;
pub mod encoder;
pub mod error;
pub mod handler;
pub mod model;
pub mod option;
pub mod platform;
pub mod response;
pub mod ring_buffer;
pub mod throttle;
pub mod transport;
pub mod wire;

pub use client::VelClient;
pub use config::VelConfig;
pub use error::{ErrorCategory, Result, VelError};
pub use model::event::Event;
pub use model::header::{CommonEventHeader, Domain, EventContext, Priority, SchemaVersion};
