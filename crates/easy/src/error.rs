//! Error types for the easy context
use thiserror::Error;

use crate::engine::EngineError;

/// Result type for context operations
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure aborts the current call; there is no warning tier.
#[derive(Error, Debug)]
pub enum Error {
    /// A required argument was absent or empty
    #[error("{operation}: argument {argument} must not be null")]
    MissingArgument {
        /// The operation that was called
        operation: &'static str,
        /// The missing argument
        argument: &'static str,
    },

    /// Option name not on the allow-list for its parameter type
    #[error("unsupported option {name}")]
    UnsupportedOption {
        /// The name as given by the caller
        name: String,
    },

    /// Info name not on the allow-list for its result type
    #[error("unsupported info {name}")]
    UnsupportedInfo {
        /// The name as given by the caller
        name: String,
    },

    /// A getter was called before any handle existed
    #[error("{operation}: call easy_init before")]
    NoHandle {
        /// The operation that was called
        operation: &'static str,
    },

    /// The engine could not create a handle
    #[error("easy_init: {source}")]
    Init {
        /// The engine failure
        #[source]
        source: EngineError,
    },

    /// The engine rejected an option value
    #[error("easy_setopt({option}, {value}): {source}")]
    SetOption {
        /// The option, as named by the caller or internally
        option: String,
        /// The rejected value
        value: String,
        /// The engine failure
        #[source]
        source: EngineError,
    },

    /// The transfer did not complete
    #[error("easy_perform: {source}")]
    Perform {
        /// The engine failure
        #[source]
        source: EngineError,
    },

    /// Invalid engine configuration
    #[error("Configuration error: {message}")]
    Config {
        /// The error message
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// The engine failure behind this error, if any
    #[must_use]
    pub fn engine(&self) -> Option<&EngineError> {
        match self {
            Self::Init { source } | Self::SetOption { source, .. } | Self::Perform { source } => {
                Some(source)
            }
            _ => None,
        }
    }
}
