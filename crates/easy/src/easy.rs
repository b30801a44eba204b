//! The `Easy` context: one request handle plus its headers and buffers

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::buffer::{DownloadBuffer, SharedUpload, UploadBuffer};
use crate::config::EasyConfig;
use crate::engine::{self, EasyOpt, Handle, Transfer};
use crate::error::{Error, Result};
use crate::headers::HeaderList;
use crate::info::{LongInfo, StringInfo};
use crate::option::{LongOption, StringAction, StringOption};

/// Result of a textual info lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoString<'a> {
    /// The raw response body, exactly as received
    Body(&'a [u8]),
    /// Engine metadata; `None` when the server never sent it
    Metadata(Option<&'a str>),
}

/// One configurable request context.
///
/// Holds at most one live [`Handle`] together with the header list and the
/// transfer buffers wired into it. Each caller session owns its own context,
/// so nothing here is shared between sessions except through the
/// cancellation token a host chooses to hand in.
pub struct Easy {
    config: EasyConfig,
    handle: Option<Handle>,
    headers: HeaderList,
    upload: SharedUpload,
    download: DownloadBuffer,
    cancellation: CancellationToken,
}

impl fmt::Debug for Easy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Easy")
            .field("handle", &self.handle)
            .field("headers", &self.headers.len())
            .field("upload", &self.upload.lock().len())
            .field("download", &self.download.len())
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish()
    }
}

impl Default for Easy {
    fn default() -> Self {
        Self::new()
    }
}

impl Easy {
    /// Create a context with the default configuration.
    pub fn new() -> Self {
        Self::from_valid_config(EasyConfig::default())
    }

    /// Create a context after validating `config`.
    pub fn with_config(config: EasyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: EasyConfig) -> Self {
        Self {
            config,
            handle: None,
            headers: HeaderList::new(),
            upload: Arc::new(Mutex::new(UploadBuffer::new())),
            download: DownloadBuffer::new(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Replace the token [`perform`](Self::perform) watches.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Token watched by [`perform`](Self::perform)
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Configuration applied to every handle
    pub fn config(&self) -> &EasyConfig {
        &self.config
    }

    /// Whether a handle is currently live
    pub fn has_handle(&self) -> bool {
        self.handle.is_some()
    }

    /// Header lines attached to the next transfer
    pub fn headers(&self) -> &HeaderList {
        &self.headers
    }

    /// Destroy any existing handle and create a fresh one.
    ///
    /// Returns whether creation succeeded; on failure no handle is left.
    pub fn init(&mut self) -> bool {
        self.handle = None;
        match Handle::new(&self.config) {
            Ok(handle) => {
                debug!("handle created");
                self.handle = Some(handle);
                true
            }
            Err(e) => {
                warn!(error = %e, "handle creation failed");
                false
            }
        }
    }

    /// Restore handle defaults, keeping the handle and its connections.
    ///
    /// The header list is discarded whether or not a handle exists.
    pub fn reset(&mut self) {
        if let Some(handle) = &mut self.handle {
            handle.reset();
        }
        self.headers.clear();
        debug!(handle = self.handle.is_some(), "context reset");
    }

    /// Destroy the handle and discard the header list.
    pub fn cleanup(&mut self) {
        self.handle = None;
        self.headers.clear();
        debug!("context cleaned up");
    }

    /// Append a `name: value` line to the header list.
    pub fn append_header(&mut self, name: &str, value: &str) -> Result<bool> {
        require("append_header", "name", name)?;
        require("append_header", "value", value)?;
        self.headers.append(name, value);
        debug!(header = name, count = self.headers.len(), "header appended");
        Ok(true)
    }

    /// Set a text option by name.
    ///
    /// The name is resolved before anything else happens, so an unsupported
    /// name leaves the handle and both buffers untouched.
    pub fn set_option_string(&mut self, option: &str, value: &str) -> Result<bool> {
        require("set_option_string", "option", option)?;
        let resolved = StringOption::resolve(option).ok_or_else(|| Error::UnsupportedOption {
            name: option.to_owned(),
        })?;
        debug!(option = %resolved, "set string option");

        match resolved.action(value) {
            StringAction::BindUpload => self.bind_upload(value.as_bytes())?,
            StringAction::Forward(opt) => {
                let handle = ensure_handle(&mut self.handle, &self.config)?;
                handle.setopt(opt).map_err(|source| Error::SetOption {
                    option: option.to_owned(),
                    value: value.to_owned(),
                    source,
                })?;
            }
        }
        Ok(true)
    }

    /// Set an integer option by name.
    pub fn set_option_long(&mut self, option: &str, value: i64) -> Result<bool> {
        require("set_option_long", "option", option)?;
        let resolved = LongOption::resolve(option).ok_or_else(|| Error::UnsupportedOption {
            name: option.to_owned(),
        })?;
        debug!(option = %resolved, value, "set long option");

        let handle = ensure_handle(&mut self.handle, &self.config)?;
        handle
            .setopt(resolved.easy_opt(value))
            .map_err(|source| Error::SetOption {
                option: option.to_owned(),
                value: value.to_string(),
                source,
            })?;
        Ok(true)
    }

    /// Replace the upload buffer with `payload` and bind it as request body.
    fn bind_upload(&mut self, payload: &[u8]) -> Result<()> {
        ensure_handle(&mut self.handle, &self.config)?;
        self.upload.lock().replace(payload);

        let len = i64::try_from(payload.len()).unwrap_or(i64::MAX);
        let steps = [
            EasyOpt::Upload(true),
            EasyOpt::ReadFunction,
            EasyOpt::ReadData(Arc::clone(&self.upload)),
            EasyOpt::InFileSize(len),
        ];
        let handle = ensure_handle(&mut self.handle, &self.config)?;
        for step in steps {
            let option = step.name();
            let value = engine::display_value(&step);
            handle.setopt(step).map_err(|source| Error::SetOption {
                option: option.to_owned(),
                value,
                source,
            })?;
        }
        debug!(bytes = payload.len(), "upload bound");
        Ok(())
    }

    /// Run the configured transfer, aborting when the context's own
    /// cancellation token fires.
    pub async fn perform(&mut self) -> Result<bool> {
        let probe = self.cancellation.clone();
        self.perform_until(&probe).await
    }

    /// Run the configured transfer, aborting when `probe` fires.
    ///
    /// Any HTTP status is a success. A cancelled transfer fails rather than
    /// returning whatever body arrived before the abort.
    pub async fn perform_until(&mut self, probe: &CancellationToken) -> Result<bool> {
        let handle = ensure_handle(&mut self.handle, &self.config)?;
        self.download.clear();

        let transfer = Transfer {
            headers: &self.headers,
            sink: &mut self.download,
            probe,
            config: &self.config,
        };
        handle
            .perform(transfer)
            .await
            .map_err(|source| Error::Perform { source })?;
        Ok(true)
    }

    /// Look up text info by name.
    ///
    /// `CURLINFO_RESPONSE` is served from the download buffer; everything
    /// else comes from the handle's transfer metadata.
    pub fn info_string(&self, info: &str) -> Result<InfoString<'_>> {
        require("get_info_string", "info", info)?;
        let handle = self.live_handle("get_info_string")?;
        let resolved = StringInfo::resolve(info).ok_or_else(|| Error::UnsupportedInfo {
            name: info.to_owned(),
        })?;
        debug!(info = %resolved, "get string info");

        Ok(match resolved {
            StringInfo::Response => InfoString::Body(self.download.as_bytes()),
            StringInfo::ContentType => {
                InfoString::Metadata(handle.info().content_type.as_deref())
            }
        })
    }

    /// Look up integer info by name.
    pub fn info_long(&self, info: &str) -> Result<i64> {
        require("get_info_long", "info", info)?;
        let handle = self.live_handle("get_info_long")?;
        let resolved = LongInfo::resolve(info).ok_or_else(|| Error::UnsupportedInfo {
            name: info.to_owned(),
        })?;
        debug!(info = %resolved, "get long info");

        Ok(match resolved {
            LongInfo::ResponseCode => handle.info().response_code,
        })
    }

    /// Raw body of the last transfer.
    pub fn response(&self) -> Result<&[u8]> {
        self.live_handle("get_info_string")?;
        Ok(self.download.as_bytes())
    }

    fn live_handle(&self, operation: &'static str) -> Result<&Handle> {
        self.handle.as_ref().ok_or(Error::NoHandle { operation })
    }
}

fn require(operation: &'static str, argument: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        Err(Error::MissingArgument {
            operation,
            argument,
        })
    } else {
        Ok(())
    }
}

/// The live handle, created on first use.
fn ensure_handle<'a>(slot: &'a mut Option<Handle>, config: &EasyConfig) -> Result<&'a mut Handle> {
    let handle = match slot.take() {
        Some(handle) => handle,
        None => {
            debug!("creating handle on first use");
            Handle::new(config).map_err(|source| Error::Init { source })?
        }
    };
    Ok(slot.insert(handle))
}
