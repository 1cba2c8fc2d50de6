//! The VES event model (`spec.md` §3`): domain payloads, the shared
//! header, and the tagged `Event` type the rest of the crate moves around.

pub mod domain;
pub mod event;
pub mod header;
