//! HTTP engine over `reqwest`
//!
//! The engine exposes a small capability set to the context: create a
//! handle, set a typed option on it, perform the configured transfer, read
//! metadata about the last transfer, and reset to defaults. Everything about
//! the network itself (TLS, pooling, redirects, DNS) is `reqwest`'s job.

mod client;
mod code;
mod transfer;

use std::fmt;

use http::Method;

use crate::buffer::SharedUpload;
use crate::config::EasyConfig;

pub use code::{Code, EngineError};
pub use transfer::{ALLOWED_PROTOCOLS, Transfer};

use client::CachedClient;

/// Typed option accepted by [`Handle::setopt`]
#[derive(Clone)]
pub enum EasyOpt {
    /// Target URL; a missing scheme means `http`
    Url(String),
    /// `User-Agent` header value
    UserAgent(String),
    /// Accepted encodings, empty for every supported decoder
    AcceptEncoding(String),
    /// Verb sent on the wire instead of the method's own
    CustomRequest(String),
    /// Upload mode, i.e. PUT with a body
    Upload(bool),
    /// Read the body through the streaming read source
    ReadFunction,
    /// Buffer the read source drains
    ReadData(SharedUpload),
    /// Connect timeout in seconds, `0` for the configured default
    ConnectTimeout(i64),
    /// Total timeout in milliseconds, `0` for none
    TimeoutMs(i64),
    /// Do not keep the connection for reuse
    ForbidReuse(bool),
    /// Follow redirects
    FollowLocation(bool),
    /// Redirect limit, `-1` for unlimited
    MaxRedirs(i64),
    /// POST mode
    Post(bool),
    /// Declared upload size, `-1` for unknown
    InFileSize(i64),
    /// HEAD mode
    NoBody(bool),
}

impl EasyOpt {
    /// Canonical option name, used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::Url(_) => "CURLOPT_URL",
            Self::UserAgent(_) => "CURLOPT_USERAGENT",
            Self::AcceptEncoding(_) => "CURLOPT_ACCEPT_ENCODING",
            Self::CustomRequest(_) => "CURLOPT_CUSTOMREQUEST",
            Self::Upload(_) => "CURLOPT_UPLOAD",
            Self::ReadFunction => "CURLOPT_READFUNCTION",
            Self::ReadData(_) => "CURLOPT_READDATA",
            Self::ConnectTimeout(_) => "CURLOPT_CONNECTTIMEOUT",
            Self::TimeoutMs(_) => "CURLOPT_TIMEOUT_MS",
            Self::ForbidReuse(_) => "CURLOPT_FORBID_REUSE",
            Self::FollowLocation(_) => "CURLOPT_FOLLOWLOCATION",
            Self::MaxRedirs(_) => "CURLOPT_MAXREDIRS",
            Self::Post(_) => "CURLOPT_POST",
            Self::InFileSize(_) => "CURLOPT_INFILESIZE",
            Self::NoBody(_) => "CURLOPT_NOBODY",
        }
    }
}

// Buffers and strings stay out of logs.
impl fmt::Debug for EasyOpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Short rendering of the value for error messages.
pub(crate) fn display_value(opt: &EasyOpt) -> String {
    match opt {
        EasyOpt::Url(v)
        | EasyOpt::UserAgent(v)
        | EasyOpt::AcceptEncoding(v)
        | EasyOpt::CustomRequest(v) => v.clone(),
        EasyOpt::ReadFunction => "read_callback".to_owned(),
        EasyOpt::ReadData(buf) => format!("<{} bytes>", buf.lock().len()),
        EasyOpt::Upload(v)
        | EasyOpt::ForbidReuse(v)
        | EasyOpt::FollowLocation(v)
        | EasyOpt::Post(v)
        | EasyOpt::NoBody(v) => i64::from(*v).to_string(),
        EasyOpt::ConnectTimeout(v)
        | EasyOpt::TimeoutMs(v)
        | EasyOpt::MaxRedirs(v)
        | EasyOpt::InFileSize(v) => v.to_string(),
    }
}

/// Which request method the handle is in; the last mode setter wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MethodMode {
    /// Plain GET
    #[default]
    Get,
    /// POST, body from the read source if bound
    Post,
    /// PUT upload, body from the read source
    Put,
    /// HEAD, no body either way
    Head,
}

impl MethodMode {
    fn method(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Put => Method::PUT,
            Self::Head => Method::HEAD,
        }
    }

    fn sends_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

/// Option state of one handle
#[derive(Clone)]
pub(crate) struct HandleOptions {
    pub(crate) url: Option<String>,
    pub(crate) user_agent: Option<String>,
    pub(crate) accept_encoding: Option<String>,
    pub(crate) custom_request: Option<Method>,
    pub(crate) mode: MethodMode,
    pub(crate) read_function: bool,
    pub(crate) read_data: Option<SharedUpload>,
    pub(crate) infile_size: i64,
    pub(crate) connect_timeout: i64,
    pub(crate) timeout_ms: i64,
    pub(crate) forbid_reuse: bool,
    pub(crate) follow_location: bool,
    pub(crate) max_redirs: i64,
}

impl Default for HandleOptions {
    fn default() -> Self {
        Self {
            url: None,
            user_agent: None,
            accept_encoding: None,
            custom_request: None,
            mode: MethodMode::Get,
            read_function: false,
            read_data: None,
            infile_size: -1,
            connect_timeout: 0,
            timeout_ms: 0,
            forbid_reuse: false,
            follow_location: false,
            max_redirs: -1,
        }
    }
}

impl HandleOptions {
    /// Method sent on the wire
    pub(crate) fn wire_method(&self) -> Method {
        self.custom_request
            .clone()
            .unwrap_or_else(|| self.mode.method())
    }

    /// Read source, when the mode sends a body and one is bound
    pub(crate) fn body_source(&self) -> Option<&SharedUpload> {
        if self.mode.sends_body() && self.read_function {
            self.read_data.as_ref()
        } else {
            None
        }
    }
}

/// Metadata about the last transfer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferInfo {
    /// HTTP status, `0` until a response arrives
    pub response_code: i64,
    /// `Content-Type` header, when the server sent one
    pub content_type: Option<String>,
}

/// One configurable request/response cycle.
pub struct Handle {
    options: HandleOptions,
    info: TransferInfo,
    client: CachedClient,
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("method", &self.options.wire_method())
            .field("url", &self.options.url)
            .field("info", &self.info)
            .finish()
    }
}

impl Handle {
    /// Create a handle with default options.
    ///
    /// Builds the default client up front so a broken TLS backend or
    /// resolver shows up here rather than on the first transfer.
    pub fn new(config: &EasyConfig) -> Result<Self, EngineError> {
        let options = HandleOptions::default();
        let client = CachedClient::build(&options, config)?;
        Ok(Self {
            options,
            info: TransferInfo::default(),
            client,
        })
    }

    /// Apply one option; rejected values leave the handle unchanged.
    pub fn setopt(&mut self, opt: EasyOpt) -> Result<(), EngineError> {
        let o = &mut self.options;
        match opt {
            EasyOpt::Url(url) => o.url = Some(url),
            EasyOpt::UserAgent(agent) => o.user_agent = Some(agent),
            EasyOpt::AcceptEncoding(list) => o.accept_encoding = Some(list),
            EasyOpt::CustomRequest(verb) => {
                let method = Method::from_bytes(verb.as_bytes()).map_err(|_| {
                    EngineError::with_detail(Code::BadFunctionArgument, format!("method `{verb}`"))
                })?;
                o.custom_request = Some(method);
            }
            EasyOpt::Upload(on) => o.mode = if on { MethodMode::Put } else { MethodMode::Get },
            EasyOpt::ReadFunction => o.read_function = true,
            EasyOpt::ReadData(source) => o.read_data = Some(source),
            EasyOpt::ConnectTimeout(secs) => o.connect_timeout = non_negative(secs)?,
            EasyOpt::TimeoutMs(ms) => o.timeout_ms = non_negative(ms)?,
            EasyOpt::ForbidReuse(on) => o.forbid_reuse = on,
            EasyOpt::FollowLocation(on) => o.follow_location = on,
            EasyOpt::MaxRedirs(max) => o.max_redirs = at_least_minus_one(max)?,
            EasyOpt::Post(on) => o.mode = if on { MethodMode::Post } else { MethodMode::Get },
            EasyOpt::InFileSize(size) => o.infile_size = at_least_minus_one(size)?,
            EasyOpt::NoBody(on) => {
                if on {
                    o.mode = MethodMode::Head;
                } else if o.mode == MethodMode::Head {
                    o.mode = MethodMode::Get;
                }
            }
        }
        Ok(())
    }

    /// Restore default options and forget the last transfer.
    ///
    /// The pooled client survives, so open connections can still be reused.
    pub fn reset(&mut self) {
        self.options = HandleOptions::default();
        self.info = TransferInfo::default();
    }

    /// Metadata about the last transfer
    pub fn info(&self) -> &TransferInfo {
        &self.info
    }

    /// Current method mode
    pub fn mode(&self) -> MethodMode {
        self.options.mode
    }

    /// Declared upload size
    pub fn infile_size(&self) -> i64 {
        self.options.infile_size
    }

    /// Whether a read source is bound
    pub fn has_read_source(&self) -> bool {
        self.options.read_function && self.options.read_data.is_some()
    }
}

fn non_negative(value: i64) -> Result<i64, EngineError> {
    if value < 0 {
        Err(EngineError::with_detail(
            Code::BadFunctionArgument,
            format!("{value} is negative"),
        ))
    } else {
        Ok(value)
    }
}

fn at_least_minus_one(value: i64) -> Result<i64, EngineError> {
    if value < -1 {
        Err(EngineError::with_detail(
            Code::BadFunctionArgument,
            format!("{value} is below -1"),
        ))
    } else {
        Ok(value)
    }
}
