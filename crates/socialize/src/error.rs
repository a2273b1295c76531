use std::fmt;

use socialize_json::JsonError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by strict accessors and by record mapping.
///
/// Defaulted accessors (`get_or` and friends) never return these; they fall
/// back to the caller's default instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no value for key {0:?}")]
    KeyNotFound(String),

    #[error("index {index} is out of range for a sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("cannot parse {value:?} as {target}")]
    Format { value: String, target: &'static str },

    #[error("cannot cast {found} to {target}")]
    InvalidCast {
        found: &'static str,
        target: &'static str,
    },

    #[error("type {target} is not supported: {detail}")]
    UnsupportedType { target: String, detail: String },

    /// A record member that is neither in the node nor readable as `Null`.
    #[error("missing member `{0}`")]
    MissingMember(&'static str),

    /// The node holds more than one accepted name of the same member.
    #[error("member `{0}` is given more than once")]
    DuplicateMember(&'static str),

    #[error(transparent)]
    Json(#[from] JsonError),

    #[error("{0}")]
    Record(String),
}

impl Error {
    pub(crate) fn format(value: impl Into<String>, target: &'static str) -> Self {
        Error::Format {
            value: value.into(),
            target,
        }
    }

    pub(crate) fn invalid_cast(found: &'static str, target: &'static str) -> Self {
        Error::InvalidCast { found, target }
    }

    pub(crate) fn unsupported(target: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::UnsupportedType {
            target: target.into(),
            detail: detail.into(),
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Record(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Record(msg.to_string())
    }

    fn missing_field(field: &'static str) -> Self {
        Error::MissingMember(field)
    }

    fn duplicate_field(field: &'static str) -> Self {
        Error::DuplicateMember(field)
    }
}
