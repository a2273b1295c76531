//! socialize-util - helpers shared by the socialize crates.
//!
//! - [`deep_copy`]: structural deep copy that keeps `Arc`/`Rc` aliasing.
//! - [`ordinal`]: byte-wise key ordering used for canonical output.

pub mod deep_copy;
pub mod ordinal;

pub use deep_copy::{deep_copy, CopyContext, DeepCopy};
pub use ordinal::{is_ordinal_sorted, ordinal_cmp};
