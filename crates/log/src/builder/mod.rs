//! Logger builder implementation

#[macro_use]
mod format;

use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::{Config, Format};
use crate::{Error, Result, writer};

/// Logger builder
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
}

/// Guard returned by initialization.
///
/// Hosts keep it for the lifetime of the process; a guard from a repeated
/// initialization is inactive.
#[derive(Debug)]
#[must_use = "dropping the guard early hides intent; bind it to `_guard`"]
pub struct LoggerGuard {
    active: bool,
}

impl LoggerGuard {
    pub(crate) fn noop() -> Self {
        Self { active: false }
    }

    /// Whether this initialization installed the global subscriber
    pub fn is_active(&self) -> bool {
        self.active
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

impl LoggerBuilder {
    /// Create builder from config
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Build and install the global subscriber.
    ///
    /// The filter is validated even when a subscriber is already installed,
    /// in which case an inactive guard is returned.
    pub fn build(self) -> Result<LoggerGuard> {
        // Create the filter
        let filter = EnvFilter::try_new(&self.config.level)
            .map_err(|e| Error::Filter(format!("{}: {e}", self.config.level)))?;

        if tracing::dispatcher::has_been_set() {
            return Ok(LoggerGuard::noop());
        }

        let writer = writer::make_writer(self.config.writer);
        let display = &self.config.display;

        // Build the format layer
        let fmt_layer: BoxedLayer = match self.config.format {
            Format::Pretty => create_fmt_layer!(pretty, display, writer),
            Format::Compact => create_fmt_layer!(compact, display, writer),
            Format::Json => create_json_layer!(display, writer),
        };

        Registry::default()
            .with(fmt_layer.with_filter(filter))
            .try_init()
            .map_err(|e| Error::Init(e.to_string()))?;

        Ok(LoggerGuard { active: true })
    }
}
