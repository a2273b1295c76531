use thiserror::Error;

/// Errors produced while decoding JSON text.
#[derive(Error, Debug)]
pub enum JsonError {
    #[error("invalid JSON at offset {0}")]
    Invalid(usize),

    #[error("invalid UTF-8 in JSON input")]
    InvalidUtf8,

    #[error("unexpected data after the JSON value at offset {0}")]
    TrailingData(usize),

    #[error("nesting exceeds {0} levels")]
    NestingTooDeep(usize),

    #[error("input of {0} bytes exceeds the configured size limit")]
    InputTooLarge(usize),

    #[error("invalid string escape: {0}")]
    Escape(#[from] serde_json::Error),
}
