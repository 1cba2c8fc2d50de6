//! Other domain (`spec.md` §3.3) — a catch-all bag of named fields for
//! events that don't fit one of the named domains. Wire key: `otherFields`.

use super::NameValuePair;

#[derive(Debug, Clone, Default)]
pub struct OtherFields {
    pub name_value_pairs: Vec<NameValuePair>,
}

impl OtherFields {
    pub fn new() -> Self {
        OtherFields::default()
    }

    pub fn add_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        super::push_info(&mut self.name_value_pairs, name, value);
    }
}
