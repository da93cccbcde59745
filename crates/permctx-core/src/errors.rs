//! Context error types.
//!
//! Most of the subsystem never surfaces these: invalid contributions are
//! dropped silently. They exist for the strict constructors used when parsing
//! configuration or operator input.

use thiserror::Error;

/// Errors produced by strict context and identifier constructors.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The context key is empty or blank.
    #[error("invalid context key: {0:?}")]
    InvalidKey(String),
    /// The context value failed the validity predicate.
    #[error("invalid context value for key '{key}': {value:?}")]
    InvalidValue {
        /// Key the value was submitted under.
        key: String,
        /// The rejected value.
        value: String,
    },
    /// A namespaced identifier could not be parsed.
    #[error("invalid resource key: {0:?}")]
    InvalidResourceKey(String),
}

/// Result type for strict context operations.
pub type Result<T> = std::result::Result<T, ContextError>;
