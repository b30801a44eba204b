//! Engine configuration
//!
//! These settings shape the client the engine builds; they are not options a
//! caller can change through the textual interface, and `reset` keeps them.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for every handle created by an [`Easy`](crate::Easy) context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EasyConfig {
    /// Connect timeout used while `CURLOPT_CONNECTTIMEOUT` is `0`
    pub default_connect_timeout_secs: u64,
    /// How long an idle pooled connection is kept
    pub pool_idle_timeout_secs: u64,
    /// Idle connections kept per host
    pub pool_max_idle_per_host: usize,
    /// TCP keepalive interval, disabled when `None`
    pub tcp_keepalive_secs: Option<u64>,
    /// Largest chunk the upload stream hands to the engine at once
    pub upload_chunk_size: usize,
}

impl Default for EasyConfig {
    fn default() -> Self {
        Self {
            default_connect_timeout_secs: 300,
            pool_idle_timeout_secs: 90,
            pool_max_idle_per_host: 32,
            tcp_keepalive_secs: Some(60),
            upload_chunk_size: 16 * 1024,
        }
    }
}

impl EasyConfig {
    /// Check the configuration before any handle is built.
    pub fn validate(&self) -> Result<()> {
        if self.default_connect_timeout_secs == 0 {
            return Err(Error::config("default connect timeout cannot be zero"));
        }
        if self.upload_chunk_size == 0 {
            return Err(Error::config("upload chunk size cannot be zero"));
        }
        Ok(())
    }

    pub(crate) fn default_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.default_connect_timeout_secs)
    }

    pub(crate) fn pool_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_idle_timeout_secs)
    }

    pub(crate) fn tcp_keepalive(&self) -> Option<Duration> {
        self.tcp_keepalive_secs.map(Duration::from_secs)
    }
}
