//! Option primitives (C1): a uniform "maybe-set" wrapper with set-once
//! discipline.
//!
//! The C library keeps a parallel `evel_option_*` struct per scalar type
//! (`EVEL_OPTION_STRING`, `EVEL_OPTION_INT`, ...). Rust's sum types make
//! that unnecessary: a single generic `Field<T>` plus `set`/`force`/`get`
//! covers every optional scalar, string, or nested value used across the
//! event model (`spec.md` §3.2, §4.1, §9 "Design Notes").

use tracing::warn;

/// A value that starts unset and accepts at most one caller-provided
/// assignment.
///
/// `set` is the public, producer-facing entry point: once a field holds a
/// value, further `set` calls are logged and ignored rather than returning
/// an error, matching the C library's behavior (`evel_option_*_set` fires a
/// `EVEL_ERROR` log and returns without altering state). `force` bypasses
/// the discipline entirely and is reserved for construction-time code (the
/// per-domain factories) that can already guarantee single assignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Field<T> {
    value: Option<T>,
}

impl<T> Field<T> {
    /// An unset field.
    pub const fn unset() -> Self {
        Field { value: None }
    }

    /// Set-once: the first call wins, later calls are logged and dropped.
    ///
    /// `label` names the field for the warning message; it costs nothing
    /// when the field is still unset (the common path).
    pub fn set(&mut self, value: T, label: &str) {
        if self.value.is_some() {
            warn!(field = label, "ignoring duplicate set on already-set option field");
            return;
        }
        self.value = Some(value);
    }

    /// Unconditional assignment. Only the per-domain factories, which
    /// already enforce single-assignment by construction, may call this.
    pub(crate) fn force(&mut self, value: T) {
        self.value = Some(value);
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_inner(self) -> Option<T> {
        self.value
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        Field { value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Property 3 (spec.md §8): two successive `set` calls yield the first
    /// value.
    #[test]
    fn set_once_keeps_first_value() {
        let mut field = Field::unset();
        field.set(1, "x");
        field.set(2, "x");
        assert_eq!(field.get(), Some(&1));
    }

    #[test]
    fn force_always_overwrites() {
        let mut field = Field::unset();
        field.force(1);
        field.force(2);
        assert_eq!(field.get(), Some(&2));
    }
}
