//! Engine error types.

use thiserror::Error;

/// Errors from calculator registration and process-wide setup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A calculator with the same name is already registered.
    #[error("context calculator already registered: {0}")]
    DuplicateCalculator(String),

    /// The process-wide context manager was already installed.
    #[error("context manager already initialized")]
    AlreadyInitialized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            EngineError::DuplicateCalculator("world".into()).to_string(),
            "context calculator already registered: world"
        );
        assert_eq!(
            EngineError::AlreadyInitialized.to_string(),
            "context manager already initialized"
        );
    }
}
