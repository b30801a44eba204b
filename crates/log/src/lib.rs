//! # pgcurl log
//!
//! Logging bootstrap shared by pgcurl hosts.
//!
//! ```no_run
//! fn main() -> pgcurl_log::Result<()> {
//!     // Environment first, then a build-profile preset
//!     let _guard = pgcurl_log::auto_init()?;
//!
//!     tracing::info!(port = 8080, "host starting");
//!     Ok(())
//! }
//! ```

mod builder;
mod config;
mod writer;

pub use builder::{LoggerBuilder, LoggerGuard};
pub use config::{Config, DisplayConfig, Format, WriterConfig};

/// Result type for logger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for logger operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filter parsing error
    #[error("Invalid filter: {0}")]
    Filter(String),

    /// Installing the global subscriber failed
    #[error("Logger initialization failed: {0}")]
    Init(String),
}

/// Initialize from the environment when it names a filter, otherwise from
/// the preset matching the build profile.
pub fn auto_init() -> Result<LoggerGuard> {
    if std::env::var("PGCURL_LOG").is_ok() || std::env::var("RUST_LOG").is_ok() {
        init_with(Config::from_env())
    } else if cfg!(debug_assertions) {
        init_with(Config::development())
    } else {
        init_with(Config::production())
    }
}

/// Initialize with default configuration
pub fn init() -> Result<LoggerGuard> {
    init_with(Config::default())
}

/// Initialize with custom configuration
pub fn init_with(config: Config) -> Result<LoggerGuard> {
    LoggerBuilder::from_config(config).build()
}
