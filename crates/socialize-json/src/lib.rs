//! Canonical JSON codec for the socialize containers.
//!
//! Text is decoded into [`JsonToken`], an intermediate tree that keeps
//! integers, unsigned integers and floats apart and preserves source key
//! order. The containers in the `socialize` crate normalize that tree into
//! their own value model. Encoding goes the other way and always writes
//! object keys in ordinal order, which is what makes the output canonical.
//!
//! # Example
//!
//! ```
//! use socialize_json::{parse, to_canonical_string, JsonToken};
//!
//! let token = parse(r#"{"b": 1, "a": [true, 2.5]}"#).unwrap();
//! assert_eq!(token.kind(), "object");
//! assert_eq!(to_canonical_string(&token), r#"{"a":[true,2.5],"b":1}"#);
//! ```

mod decoder;
mod encoder;
mod error;
mod limits;
mod token;

pub use decoder::JsonDecoder;
pub use encoder::JsonEncoder;
pub use error::JsonError;
pub use limits::Limits;
pub use token::JsonToken;

/// Decode JSON text with the default [`Limits`].
pub fn parse(text: &str) -> Result<JsonToken, JsonError> {
    JsonDecoder::default().decode_str(text)
}

/// Decode JSON text with explicit limits.
pub fn parse_with(text: &str, limits: &Limits) -> Result<JsonToken, JsonError> {
    JsonDecoder::new(*limits).decode_str(text)
}

/// Render a token as compact canonical JSON.
pub fn to_canonical_string(token: &JsonToken) -> String {
    JsonEncoder::new().encode(token)
}
