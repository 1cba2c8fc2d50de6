//! Streaming JSON encoder with checkpoint/rewind suppression (`spec.md`
//! §4.3). Hand-rolled rather than built on `serde_json::to_writer`: the
//! hard, in-scope part of this component is "write a key, then
//! provisionally open a container; if nothing ends up written into it
//! because every member was throttled away, rewind the buffer to before
//! the key was written" — a streaming writer, not a tree serializer,
//! needs this. Grounded on
//! `original_source/vnfs/VES/code/evel_library/evel_json_buffer.c`'s
//! `evel_json_checkpoint`/`evel_json_rewind` (store/restore a byte offset;
//! the checkpoint resets to "none" immediately after a rewind, so a second
//! rewind without an intervening checkpoint is a programming error, not a
//! silent double-undo).

use std::fmt::Write as _;

use crate::error::{Result, VelError};
use crate::throttle::ThrottleSpec;

/// Caps how large a single encoded event may grow. The collector schema
/// has no hard limit, but an unbounded producer bug (e.g. an additional-info
/// loop) must not be allowed to grow a single POST body without bound
/// (`spec.md` §4.3 "Resource bounds").
const MAX_EVENT_BYTES: usize = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

struct Frame {
    kind: Container,
    wrote_member: bool,
    start_offset: usize,
}

/// A streaming, append-only JSON writer with one level of checkpoint/
/// rewind. Not a general JSON tree builder: callers open/close containers
/// and write key-value pairs in the order they want them to appear on the
/// wire, same discipline as the C library's buffer.
struct Checkpoint {
    offset: usize,
    stack_len: usize,
    parent_wrote_member: Option<bool>,
}

pub struct JsonEncoder {
    buf: Vec<u8>,
    stack: Vec<Frame>,
    checkpoint: Option<Checkpoint>,
    last_closed_was_empty: bool,
}

impl JsonEncoder {
    pub fn new() -> Self {
        JsonEncoder {
            buf: Vec::with_capacity(4096),
            stack: Vec::new(),
            checkpoint: None,
            last_closed_was_empty: false,
        }
    }

    fn check_bounds(&self) -> Result<()> {
        if self.buf.len() > MAX_EVENT_BYTES {
            return Err(VelError::EncodingOverflow {
                truncated_in_string: false,
            });
        }
        Ok(())
    }

    fn before_member(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            if frame.wrote_member {
                self.buf.push(b',');
            }
            frame.wrote_member = true;
        }
    }

    fn start_container(&mut self, kind: Container) {
        self.before_member();
        let start_offset = self.buf.len();
        self.buf.push(match kind {
            Container::Object => b'{',
            Container::Array => b'[',
        });
        self.stack.push(Frame {
            kind,
            wrote_member: false,
            start_offset,
        });
    }

    fn end_container(&mut self, kind: Container) {
        debug_assert_eq!(self.stack.last().map(|f| f.kind), Some(kind));
        let frame = self.stack.pop();
        self.last_closed_was_empty = frame.map(|f| !f.wrote_member).unwrap_or(true);
        self.buf.push(match kind {
            Container::Object => b'}',
            Container::Array => b']',
        });
    }

    /// True if the container most recently closed by `end_object`/
    /// `end_array` (or `named_object`/`named_array`'s matching close) ended
    /// up with zero members. Lets callers rewind a container that turned
    /// out empty after throttle filtering without tracking a parallel
    /// "did I write anything" flag at every call site (`spec.md` §4.3, §9).
    pub fn last_closed_was_empty(&self) -> bool {
        self.last_closed_was_empty
    }

    pub fn start_object(&mut self) {
        self.start_container(Container::Object);
    }

    pub fn end_object(&mut self) {
        self.end_container(Container::Object);
    }

    pub fn start_array(&mut self) {
        self.start_container(Container::Array);
    }

    pub fn end_array(&mut self) {
        self.end_container(Container::Array);
    }

    /// Writes `"key":` ahead of a nested value the caller is about to
    /// write themselves (a sub-object or array).
    pub fn key(&mut self, key: &str) {
        self.before_member();
        self.write_escaped_string(key);
        self.buf.push(b':');
    }

    pub fn named_object(&mut self, key: &str) {
        self.key(key);
        self.start_object();
    }

    pub fn named_array(&mut self, key: &str) {
        self.key(key);
        self.start_array();
    }

    /// Marks the current end of the buffer as the one rewindable
    /// checkpoint. `spec.md` §4.3: at most one checkpoint is live at a
    /// time; setting a new one before rewinding the last discards it.
    pub fn checkpoint(&mut self) {
        self.checkpoint = Some(Checkpoint {
            offset: self.buf.len(),
            stack_len: self.stack.len(),
            parent_wrote_member: self.stack.last().map(|f| f.wrote_member),
        });
    }

    /// Truncates the buffer back to the last checkpoint and clears it.
    /// Used when a container opened since the checkpoint ends up with no
    /// members because every field inside it was throttled away
    /// (`spec.md` §4.4's suppression contract: an empty optional
    /// sub-object must not appear on the wire at all).
    ///
    /// Also pops any container frames opened after the checkpoint, and
    /// restores the enclosing frame's `wrote_member` flag to whatever it
    /// was before the checkpointed key was written, so a subsequent
    /// sibling member doesn't get a stray leading comma.
    pub fn rewind(&mut self) {
        if let Some(cp) = self.checkpoint.take() {
            self.buf.truncate(cp.offset);
            self.stack.truncate(cp.stack_len);
            if let (Some(frame), Some(was)) = (self.stack.last_mut(), cp.parent_wrote_member) {
                frame.wrote_member = was;
            }
        }
    }

    /// Marks that the member written since the last checkpoint should be
    /// treated as absent if a rewind never happens — a no-op on the
    /// buffer itself, but clears the pending checkpoint so a later,
    /// unrelated rewind can't accidentally undo this member too.
    pub fn commit(&mut self) {
        self.checkpoint = None;
    }

    fn write_escaped_string(&mut self, s: &str) {
        self.buf.push(b'"');
        for ch in s.chars() {
            match ch {
                '"' => self.buf.extend_from_slice(b"\\\""),
                '\\' => self.buf.extend_from_slice(b"\\\\"),
                '\n' => self.buf.extend_from_slice(b"\\n"),
                '\r' => self.buf.extend_from_slice(b"\\r"),
                '\t' => self.buf.extend_from_slice(b"\\t"),
                c if (c as u32) < 0x20 => {
                    let mut escape = String::with_capacity(6);
                    let _ = write!(escape, "\\u{:04x}", c as u32);
                    self.buf.extend_from_slice(escape.as_bytes());
                }
                c => {
                    let mut tmp = [0u8; 4];
                    self.buf
                        .extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
                }
            }
        }
        self.buf.push(b'"');
    }

    /// Writes a string value, truncating at a whole-character boundary if
    /// it exceeds `max_chars` (`spec.md` §4.3: "values are truncated, not
    /// rejected, at an implementation-defined maximum length; truncation
    /// never splits an escape sequence"). Working from `char`s rather
    /// than bytes means an escape sequence is always emitted whole or not
    /// at all.
    pub fn write_string_value(&mut self, value: &str, max_chars: usize) -> bool {
        if value.chars().count() <= max_chars {
            self.write_escaped_string(value);
            false
        } else {
            let truncated: String = value.chars().take(max_chars).collect();
            self.write_escaped_string(&truncated);
            true
        }
    }

    pub fn write_raw_number(&mut self, rendered: &str) {
        self.buf.extend_from_slice(rendered.as_bytes());
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf
            .extend_from_slice(if value { b"true" } else { b"false" });
    }

    /// `key: "string"` with the spec's truncation behavior. Returns
    /// whether truncation occurred, so callers can surface
    /// `EncodingOverflow { truncated_in_string: true }` if they treat
    /// truncation as swallowed-but-loggable.
    pub fn kv_string(&mut self, key: &str, value: &str, max_chars: usize) -> Result<bool> {
        self.key(key);
        let truncated = self.write_string_value(value, max_chars);
        self.check_bounds()?;
        Ok(truncated)
    }

    pub fn kv_int(&mut self, key: &str, value: i64) -> Result<()> {
        self.key(key);
        self.write_raw_number(&value.to_string());
        self.check_bounds()
    }

    pub fn kv_uint64(&mut self, key: &str, value: u64) -> Result<()> {
        self.key(key);
        self.write_raw_number(&value.to_string());
        self.check_bounds()
    }

    pub fn kv_double(&mut self, key: &str, value: f64) -> Result<()> {
        self.key(key);
        if value.fract() == 0.0 && value.is_finite() {
            self.write_raw_number(&format!("{:.1}", value));
        } else {
            self.write_raw_number(&value.to_string());
        }
        self.check_bounds()
    }

    pub fn kv_bool(&mut self, key: &str, value: bool) -> Result<()> {
        self.key(key);
        self.write_bool(value);
        self.check_bounds()
    }

    /// RFC 2822 timestamp field (`spec.md` §3.1 "time fields are
    /// formatted per RFC 2822"), via `chrono` rather than hand-rolling
    /// calendar arithmetic.
    pub fn kv_rfc2822_time(&mut self, key: &str, epoch_micros: u64) -> Result<()> {
        let secs = (epoch_micros / 1_000_000) as i64;
        let nanos = ((epoch_micros % 1_000_000) * 1000) as u32;
        let dt = chrono::DateTime::from_timestamp(secs, nanos)
            .unwrap_or_else(|| chrono::DateTime::from_timestamp(0, 0).unwrap());
        self.kv_string(key, &dt.to_rfc2822(), usize::MAX)?;
        Ok(())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Default for JsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// True if `throttle` suppresses this optional field by name (`spec.md`
/// §4.4). A `None` spec (domain not throttled at all) suppresses nothing.
pub fn field_suppressed(throttle: Option<&ThrottleSpec>, field_name: &str) -> bool {
    throttle
        .map(|t| t.is_field_suppressed(field_name))
        .unwrap_or(false)
}

pub fn nv_pair_suppressed(throttle: Option<&ThrottleSpec>, list_name: &str, key: &str) -> bool {
    throttle
        .map(|t| t.is_nv_pair_suppressed(list_name, key))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_with_no_members_round_trips() {
        let mut enc = JsonEncoder::new();
        enc.start_object();
        enc.end_object();
        assert_eq!(enc.into_bytes(), b"{}");
    }

    #[test]
    fn sibling_members_get_commas() {
        let mut enc = JsonEncoder::new();
        enc.start_object();
        enc.kv_int("a", 1).unwrap();
        enc.kv_int("b", 2).unwrap();
        enc.end_object();
        assert_eq!(enc.into_bytes(), br#"{"a":1,"b":2}"#);
    }

    #[test]
    fn checkpoint_rewind_drops_empty_optional_subobject() {
        let mut enc = JsonEncoder::new();
        enc.start_object();
        enc.kv_int("mandatory", 1).unwrap();
        enc.checkpoint();
        enc.named_object("optional");
        // nothing gets written inside: suppressed away entirely
        enc.end_object();
        enc.rewind();
        enc.end_object();
        assert_eq!(enc.into_bytes(), br#"{"mandatory":1}"#);
    }

    #[test]
    fn checkpoint_after_commit_is_independent() {
        let mut enc = JsonEncoder::new();
        enc.start_object();
        enc.checkpoint();
        enc.kv_int("a", 1).unwrap();
        enc.commit();
        enc.kv_int("b", 2).unwrap();
        enc.end_object();
        assert_eq!(enc.into_bytes(), br#"{"a":1,"b":2}"#);
    }

    #[test]
    fn string_truncation_never_splits_a_char() {
        let mut enc = JsonEncoder::new();
        let truncated = enc.kv_string("s", "héllo", 2).unwrap();
        assert!(truncated);
        assert_eq!(enc.into_bytes(), br#""s":"hé""#.to_vec());
    }
}
