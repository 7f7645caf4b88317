// SPDX-License-Identifier: MIT OR Apache-2.0

//! RowFlux Core Error Types
//!
//! Error handling for matcher runtime operations. Pattern compilation has
//! its own error type ([`crate::pattern_compiler::CompileError`]) which
//! converts into [`RowFluxError`] at the API boundary.

use thiserror::Error;

use crate::pattern_compiler::CompileError;

/// Result type for RowFlux operations
pub type RowFluxResult<T> = Result<T, RowFluxError>;

/// RowFlux runtime error types
#[derive(Error, Debug)]
pub enum RowFluxError {
    #[error("pattern compilation failed: {0}")]
    Compile(#[from] CompileError),

    #[error("out-of-order row index: expected {expected}, got {got}")]
    OutOfOrderRow { expected: usize, got: usize },

    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        config_key: Option<String>,
    },

    #[error("internal invariant violated: {message}")]
    Internal { message: String },

    #[error("{0}")]
    Other(String),
}

impl RowFluxError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            config_key: None,
        }
    }

    /// Create a configuration error with a specific key
    pub fn configuration_with_key(
        message: impl Into<String>,
        config_key: impl Into<String>,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            config_key: Some(config_key.into()),
        }
    }

    /// Create an internal invariant error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a generic error from a string
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}
