//! Platform metadata discovery is an external collaborator (`spec.md` §1:
//! "metadata discovery against a cloud platform" is out of scope). What the
//! core owns is the shape of the defaults it consumes (`spec.md` §3.1,
//! §4.8) and the trait boundary a caller's discovery code plugs into.

use crate::error::Result;

/// Defaults applied to header fields a producer didn't set explicitly
/// (`spec.md` §3.1: "Defaults for names/ids come from platform metadata at
/// init").
#[derive(Debug, Clone)]
pub struct PlatformMetadata {
    pub reporting_entity_name: String,
    pub reporting_entity_id: Option<String>,
    pub source_name: String,
    pub source_id: Option<String>,
    pub functional_role: String,
}

/// External collaborator that looks up [`PlatformMetadata`] from whatever
/// cloud platform the VNF runs on (OpenStack instance metadata, a cloud-init
/// datasource, ...). A lookup failure is non-fatal (`spec.md` §4.8): the
/// caller falls back to [`StaticPlatformMetadata`]-style defaults and
/// `initialize` merely logs the failure.
pub trait PlatformMetadataProvider: Send + Sync {
    fn discover(&self) -> Result<PlatformMetadata>;
}

/// A provider that always returns a fixed, caller-supplied set of
/// defaults. Useful standalone (no cloud platform to query) and as the
/// fallback when a real provider's `discover()` fails.
#[derive(Debug, Clone)]
pub struct StaticPlatformMetadata(pub PlatformMetadata);

impl PlatformMetadataProvider for StaticPlatformMetadata {
    fn discover(&self) -> Result<PlatformMetadata> {
        Ok(self.0.clone())
    }
}
