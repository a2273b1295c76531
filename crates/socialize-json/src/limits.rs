//! Decode limits.
//!
//! Input reaching the containers usually comes from a remote service, so the
//! decoder bounds both the size of the text and how deep it may nest.

/// Limits applied by [`crate::JsonDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum input size in bytes.
    pub max_input_size: usize,
    /// Maximum nesting depth of arrays and objects.
    pub max_nesting_depth: usize,
}

impl Limits {
    /// Limits for ordinary service responses.
    pub const fn standard() -> Self {
        Self {
            max_input_size: 64 * 1024 * 1024, // 64 MiB
            max_nesting_depth: 256,
        }
    }

    /// Tight limits for untrusted input such as query parameters.
    pub const fn strict() -> Self {
        Self {
            max_input_size: 1024 * 1024, // 1 MiB
            max_nesting_depth: 32,
        }
    }

    pub const fn with_max_input_size(mut self, max_input_size: usize) -> Self {
        self.max_input_size = max_input_size;
        self
    }

    pub const fn with_max_nesting_depth(mut self, max_nesting_depth: usize) -> Self {
        self.max_nesting_depth = max_nesting_depth;
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_standard() {
        assert_eq!(Limits::default(), Limits::standard());
        assert!(Limits::strict().max_nesting_depth < Limits::standard().max_nesting_depth);
    }

    #[test]
    fn builders_override_single_fields() {
        let limits = Limits::strict().with_max_nesting_depth(4);
        assert_eq!(limits.max_nesting_depth, 4);
        assert_eq!(limits.max_input_size, Limits::strict().max_input_size);
    }
}
