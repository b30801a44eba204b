//! Error types for the procedure surface
use thiserror::Error;

/// Result type for procedure calls
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of one procedure call; the call is aborted and nothing is retried.
#[derive(Error, Debug)]
pub enum Error {
    /// A SQL-nullable argument was `NULL`
    #[error("{procedure}: argument {argument} must not be null")]
    MissingArgument {
        /// The procedure that was called
        procedure: &'static str,
        /// The null argument
        argument: &'static str,
    },

    /// No procedure with this name
    #[error("unknown procedure {name}")]
    UnknownProcedure {
        /// The name as given by the caller
        name: String,
    },

    /// Wrong argument count or types for a named call
    #[error("{procedure}: {message}")]
    InvalidArguments {
        /// The procedure that was called
        procedure: &'static str,
        /// What was wrong
        message: String,
    },

    /// Bytes that must be returned as text are not valid UTF-8
    #[error("{info}: value is not valid UTF-8 text")]
    InvalidText {
        /// The info name that was requested
        info: String,
    },

    /// The easy context rejected the call
    #[error(transparent)]
    Easy(#[from] pgcurl_easy::Error),
}
