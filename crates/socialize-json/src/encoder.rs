//! Writes compact canonical JSON text from a [`JsonToken`] tree.
//!
//! Canonical means:
//! - object entries are written in ordinal (byte-wise) key order, whatever
//!   order the token holds them in;
//! - floats always carry a fraction or an exponent, so they decode back as
//!   floats rather than integers;
//! - non-finite floats are written as `null`;
//! - no insignificant whitespace.

use socialize_util::ordinal::{is_ordinal_sorted, ordinal_cmp};

use crate::token::JsonToken;

#[derive(Debug, Default)]
pub struct JsonEncoder {
    out: String,
}

impl JsonEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode(&mut self, token: &JsonToken) -> String {
        self.out.clear();
        self.write_any(token);
        std::mem::take(&mut self.out)
    }

    pub fn write_any(&mut self, token: &JsonToken) {
        match token {
            JsonToken::Null => self.write_null(),
            JsonToken::Bool(b) => self.write_boolean(*b),
            JsonToken::Integer(i) => self.write_integer(*i),
            JsonToken::UInteger(u) => self.write_u_integer(*u),
            JsonToken::Float(f) => self.write_float(*f),
            JsonToken::Str(s) => self.write_str(s),
            JsonToken::Array(arr) => self.write_arr(arr),
            JsonToken::Object(obj) => self.write_obj(obj),
        }
    }

    pub fn write_null(&mut self) {
        self.out.push_str("null");
    }

    pub fn write_boolean(&mut self, b: bool) {
        self.out.push_str(if b { "true" } else { "false" });
    }

    pub fn write_integer(&mut self, int: i64) {
        self.out.push_str(&int.to_string());
    }

    pub fn write_u_integer(&mut self, uint: u64) {
        self.out.push_str(&uint.to_string());
    }

    pub fn write_float(&mut self, float: f64) {
        self.out.push_str(&format_float(float));
    }

    /// Write a JSON-encoded string (with escaping).
    pub fn write_str(&mut self, s: &str) {
        let plain = s
            .bytes()
            .all(|b| (32..=126).contains(&b) && b != b'"' && b != b'\\');
        if plain {
            self.out.reserve(s.len() + 2);
            self.out.push('"');
            self.out.push_str(s);
            self.out.push('"');
            return;
        }
        let json_str = serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string());
        self.out.push_str(&json_str);
    }

    pub fn write_arr(&mut self, arr: &[JsonToken]) {
        self.out.push('[');
        for (i, item) in arr.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.write_any(item);
        }
        self.out.push(']');
    }

    /// Write an object with its keys in ordinal order.
    pub fn write_obj(&mut self, obj: &[(String, JsonToken)]) {
        if is_ordinal_sorted(obj.iter().map(|(key, _)| key.as_str())) {
            self.write_entries(obj.iter());
            return;
        }
        let mut entries: Vec<&(String, JsonToken)> = obj.iter().collect();
        entries.sort_by(|a, b| ordinal_cmp(&a.0, &b.0));
        self.write_entries(entries.into_iter());
    }

    fn write_entries<'a>(&mut self, entries: impl Iterator<Item = &'a (String, JsonToken)>) {
        self.out.push('{');
        for (i, (key, val)) in entries.enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.write_str(key);
            self.out.push(':');
            self.write_any(val);
        }
        self.out.push('}');
    }
}

fn format_float(f: f64) -> String {
    if !f.is_finite() {
        return "null".to_string();
    }
    // `Debug` is the shortest round-trip form and always keeps a `.0` or an
    // exponent, e.g. `1.0`, `0.1`, `1e20`, `1e-7`.
    format!("{f:?}")
}
