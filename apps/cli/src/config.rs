//! Layered host configuration
//!
//! Defaults, then `pgcurl.toml` (or the file named by `--config`), then
//! `PGCURL_` environment variables with `__` as the section separator, then
//! command-line flags.

use std::path::Path;

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format as _, Serialized, Toml, Yaml};
use pgcurl_easy::EasyConfig;
use pgcurl_log::Format;
use pgcurl_sql::ExtensionConfig;
use serde::{Deserialize, Serialize};

/// File read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "pgcurl.toml";

/// Everything the host reads at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Logging
    pub log: pgcurl_log::Config,
    /// Transfer engine
    pub easy: EasyConfig,
    /// Abort transfers on Ctrl-C
    pub install_signal_handler: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            log: pgcurl_log::Config::default(),
            easy: EasyConfig::default(),
            install_signal_handler: true,
        }
    }
}

impl HostConfig {
    /// Load every layer below the command line.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let figment = Self::figment(path)?.merge(
            Env::prefixed("PGCURL_")
                .filter(|key| {
                    key.as_str().contains("__")
                        || key.as_str().eq_ignore_ascii_case("install_signal_handler")
                })
                .split("__"),
        );
        let mut config: Self = figment.extract().context("invalid configuration")?;

        // The logger's own variables win over any file
        let log_env = pgcurl_log::Config::from_env();
        if std::env::var("PGCURL_LOG").is_ok() || std::env::var("RUST_LOG").is_ok() {
            config.log.level = log_env.level;
        }
        if std::env::var("PGCURL_LOG_FORMAT").is_ok() {
            config.log.format = log_env.format;
        }
        Ok(config)
    }

    /// Defaults merged with the configuration file, without environment.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        Ok(match path {
            Some(path) => {
                if !path.is_file() {
                    bail!("config file {} does not exist", path.display());
                }
                match path.extension().and_then(|e| e.to_str()) {
                    Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                    _ => figment.merge(Toml::file(path)),
                }
            }
            None => figment.merge(Toml::file(DEFAULT_CONFIG_FILE)),
        })
    }

    /// Apply command-line log flags.
    pub fn with_log_overrides(mut self, level: Option<String>, format: Option<Format>) -> Self {
        if let Some(level) = level {
            self.log.level = level;
        }
        if let Some(format) = format {
            self.log.format = format;
        }
        self
    }

    /// Configuration handed to the extension on load
    pub fn extension(&self) -> ExtensionConfig {
        ExtensionConfig {
            easy: self.easy.clone(),
            install_signal_handler: self.install_signal_handler,
        }
    }
}
