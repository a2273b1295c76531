//! Dynamic JSON-shaped containers.
//!
//! [`Node`] is an ordered string-keyed map and [`Sequence`] a list; both hold
//! [`Value`]s and nest freely. Typed reads coerce between scalar kinds
//! through their textual form, records map in and out through serde, and
//! rendering always writes keys in byte-wise order.
//!
//! # Example
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use socialize::Node;
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct User {
//!     name: String,
//!     age: i32,
//! }
//!
//! let node = Node::parse(r#"{"name": "ada", "age": "36", "extra": null}"#).unwrap();
//! let user: User = node.cast().unwrap();
//! assert_eq!(user, User { name: "ada".into(), age: 36 });
//!
//! let back = Node::from_record(&user).unwrap();
//! assert_eq!(back.to_string(), r#"{"age":36,"name":"ada"}"#);
//! ```

mod convert;
mod error;
mod interop;
pub mod node;
pub mod path;
mod query;
pub mod record;
pub mod sequence;
mod value;

pub use convert::FromValue;
pub use error::{Error, Result};
pub use node::Node;
pub use path::Lookup;
pub use record::{from_value, to_value, MemberCache};
pub use sequence::Sequence;
pub use value::Value;

pub use socialize_json::{JsonError, JsonToken, Limits};
pub use socialize_util::deep_copy::{deep_copy, DeepCopy};
