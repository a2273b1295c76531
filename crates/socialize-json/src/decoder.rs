//! Decodes JSON text into [`JsonToken`].
//!
//! Strict RFC 8259 grammar: no comments, no trailing commas, no unquoted
//! keys, nothing but whitespace after the top-level value. A leading UTF-8
//! byte-order mark is skipped.

use crate::error::JsonError;
use crate::limits::Limits;
use crate::token::JsonToken;

const BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Default)]
pub struct JsonDecoder {
    limits: Limits,
}

impl JsonDecoder {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn decode(&self, input: &[u8]) -> Result<JsonToken, JsonError> {
        if input.len() > self.limits.max_input_size {
            return Err(JsonError::InputTooLarge(input.len()));
        }
        let start = if input.starts_with(BOM) { BOM.len() } else { 0 };
        let mut reader = Reader {
            data: input,
            x: start,
            depth: 0,
            max_depth: self.limits.max_nesting_depth,
        };
        let token = reader.read_any()?;
        reader.skip_whitespace();
        if reader.x < input.len() {
            return Err(JsonError::TrailingData(reader.x));
        }
        Ok(token)
    }

    pub fn decode_str(&self, input: &str) -> Result<JsonToken, JsonError> {
        self.decode(input.as_bytes())
    }
}

struct Reader<'a> {
    data: &'a [u8],
    x: usize,
    depth: usize,
    max_depth: usize,
}

impl Reader<'_> {
    fn read_any(&mut self) -> Result<JsonToken, JsonError> {
        self.skip_whitespace();
        let x = self.x;
        let Some(&ch) = self.data.get(x) else {
            return Err(JsonError::Invalid(x));
        };
        match ch {
            b'"' => Ok(JsonToken::Str(self.read_str()?)),
            b'[' => self.read_arr(),
            b'{' => self.read_obj(),
            b'n' => self.read_literal(b"null", JsonToken::Null),
            b't' => self.read_literal(b"true", JsonToken::Bool(true)),
            b'f' => self.read_literal(b"false", JsonToken::Bool(false)),
            b'-' | b'0'..=b'9' => self.read_num(),
            _ => Err(JsonError::Invalid(x)),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.data.get(self.x) {
            self.x += 1;
        }
    }

    fn read_literal(&mut self, text: &[u8], token: JsonToken) -> Result<JsonToken, JsonError> {
        if !self.data[self.x..].starts_with(text) {
            return Err(JsonError::Invalid(self.x));
        }
        self.x += text.len();
        Ok(token)
    }

    fn digits(&mut self) -> usize {
        let start = self.x;
        while let Some(b'0'..=b'9') = self.data.get(self.x) {
            self.x += 1;
        }
        self.x - start
    }

    fn read_num(&mut self) -> Result<JsonToken, JsonError> {
        let start = self.x;
        if self.data.get(self.x) == Some(&b'-') {
            self.x += 1;
        }
        let int_start = self.x;
        let int_len = self.digits();
        if int_len == 0 || (int_len > 1 && self.data[int_start] == b'0') {
            return Err(JsonError::Invalid(int_start));
        }
        let mut is_float = false;
        if self.data.get(self.x) == Some(&b'.') {
            is_float = true;
            self.x += 1;
            if self.digits() == 0 {
                return Err(JsonError::Invalid(self.x));
            }
        }
        if let Some(b'e' | b'E') = self.data.get(self.x) {
            is_float = true;
            self.x += 1;
            if let Some(b'+' | b'-') = self.data.get(self.x) {
                self.x += 1;
            }
            if self.digits() == 0 {
                return Err(JsonError::Invalid(self.x));
            }
        }

        // Only ASCII digits, signs, '.', 'e' were consumed.
        let s = std::str::from_utf8(&self.data[start..self.x]).map_err(|_| JsonError::InvalidUtf8)?;
        if !is_float {
            if let Ok(i) = s.parse::<i64>() {
                return Ok(JsonToken::Integer(i));
            }
            if let Ok(u) = s.parse::<u64>() {
                return Ok(JsonToken::UInteger(u));
            }
        }
        s.parse::<f64>()
            .map(JsonToken::Float)
            .map_err(|_| JsonError::Invalid(start))
    }

    fn read_str(&mut self) -> Result<String, JsonError> {
        if self.data.get(self.x) != Some(&b'"') {
            return Err(JsonError::Invalid(self.x));
        }
        let x0 = self.x + 1;
        let x1 = find_ending_quote(self.data, x0)?;
        let s = decode_json_string(&self.data[x0..x1])?;
        self.x = x1 + 1;
        Ok(s)
    }

    fn enter(&mut self) -> Result<(), JsonError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(JsonError::NestingTooDeep(self.max_depth));
        }
        Ok(())
    }

    fn read_arr(&mut self) -> Result<JsonToken, JsonError> {
        self.enter()?;
        self.x += 1; // '['
        let mut arr = Vec::new();
        self.skip_whitespace();
        if self.data.get(self.x) == Some(&b']') {
            self.x += 1;
            self.depth -= 1;
            return Ok(JsonToken::Array(arr));
        }
        loop {
            arr.push(self.read_any()?);
            self.skip_whitespace();
            match self.data.get(self.x) {
                Some(b',') => self.x += 1,
                Some(b']') => {
                    self.x += 1;
                    self.depth -= 1;
                    return Ok(JsonToken::Array(arr));
                }
                _ => return Err(JsonError::Invalid(self.x)),
            }
        }
    }

    fn read_obj(&mut self) -> Result<JsonToken, JsonError> {
        self.enter()?;
        self.x += 1; // '{'
        let mut obj = Vec::new();
        self.skip_whitespace();
        if self.data.get(self.x) == Some(&b'}') {
            self.x += 1;
            self.depth -= 1;
            return Ok(JsonToken::Object(obj));
        }
        loop {
            self.skip_whitespace();
            let key = self.read_str()?;
            self.skip_whitespace();
            if self.data.get(self.x) != Some(&b':') {
                return Err(JsonError::Invalid(self.x));
            }
            self.x += 1;
            let val = self.read_any()?;
            obj.push((key, val));
            self.skip_whitespace();
            match self.data.get(self.x) {
                Some(b',') => self.x += 1,
                Some(b'}') => {
                    self.x += 1;
                    self.depth -= 1;
                    return Ok(JsonToken::Object(obj));
                }
                _ => return Err(JsonError::Invalid(self.x)),
            }
        }
    }
}

/// Index of the quote closing a string whose body starts at `x0`.
fn find_ending_quote(data: &[u8], x0: usize) -> Result<usize, JsonError> {
    let mut x = x0;
    while let Some(&b) = data.get(x) {
        match b {
            b'"' => return Ok(x),
            b'\\' => x += 2,
            0x00..=0x1f => return Err(JsonError::Invalid(x)),
            _ => x += 1,
        }
    }
    Err(JsonError::Invalid(x0.saturating_sub(1)))
}

/// Decode a JSON string body (between the quotes).
fn decode_json_string(bytes: &[u8]) -> Result<String, JsonError> {
    if !bytes.contains(&b'\\') {
        return std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| JsonError::InvalidUtf8);
    }
    // Escapes (including surrogate pairs) are left to serde_json.
    let mut quoted = Vec::with_capacity(bytes.len() + 2);
    quoted.push(b'"');
    quoted.extend_from_slice(bytes);
    quoted.push(b'"');
    let s: String = serde_json::from_slice(&quoted)?;
    Ok(s)
}
