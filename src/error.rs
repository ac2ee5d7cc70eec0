//! Error types for the evictkit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache construction parameters are
//!   invalid (e.g. an admission threshold of zero, a shard count that
//!   cannot cover the requested capacity).
//! - [`InvariantError`]: Returned when internal data-structure invariants
//!   are violated (debug-only `check_invariants` methods).
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::builder::{CacheBuilder, PolicyKind};
//! use evictkit::error::ConfigError;
//!
//! // Fallible construction for user-configurable parameters
//! let bad = CacheBuilder::new(100).try_build::<u64, String>(PolicyKind::LruK {
//!     history_capacity: 100,
//!     k: 0,
//! });
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache construction parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
/// Carries a human-readable description of which parameter failed
/// validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Invariant violations indicate a library bug; the debug-build
/// `debug_validate_invariants` methods panic instead of returning this,
/// but test helpers that want to report rather than abort can use it as
/// a diagnostic payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("k must be >= 1");
        assert_eq!(err.to_string(), "k must be >= 1");
    }

    #[test]
    fn config_message_accessor() {
        let err = ConfigError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn config_clone_and_eq() {
        let a = ConfigError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("list length mismatch");
        assert_eq!(err.to_string(), "list length mismatch");
    }

    #[test]
    fn errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
        assert_error::<InvariantError>();
    }
}
