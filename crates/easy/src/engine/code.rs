//! Engine result codes and their textual descriptions

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Failure class reported by the HTTP engine.
///
/// The display strings are the descriptions callers see in error messages,
/// so they stay stable across releases.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Code {
    /// Scheme outside the allowed protocol set
    #[error("Unsupported protocol")]
    UnsupportedProtocol,

    /// Client could not be constructed
    #[error("Failed initialization")]
    FailedInit,

    /// URL missing or unparsable
    #[error("URL using bad/illegal format or missing URL")]
    UrlMalformat,

    /// DNS lookup failed
    #[error("Couldn't resolve host name")]
    CouldntResolveHost,

    /// TCP connect failed
    #[error("Couldn't connect to server")]
    CouldntConnect,

    /// TLS handshake failed
    #[error("SSL connect error")]
    SslConnect,

    /// Connect or total timeout elapsed
    #[error("Timeout was reached")]
    OperationTimedOut,

    /// Cancellation probe fired during the transfer
    #[error("Operation was aborted by an application callback")]
    AbortedByCallback,

    /// Option value rejected
    #[error("A libcurl function was given a bad argument")]
    BadFunctionArgument,

    /// Redirect limit exceeded
    #[error("Number of redirects hit maximum amount")]
    TooManyRedirects,

    /// Request could not be written to the peer
    #[error("Failed sending data to the peer")]
    SendError,

    /// Response could not be read from the peer
    #[error("Failure when receiving data from the peer")]
    RecvError,

    /// Compressed body could not be decoded
    #[error("Unrecognized or bad HTTP Content or Transfer-Encoding")]
    BadContentEncoding,
}

/// Error returned by the HTTP engine: a [`Code`] plus optional detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    code: Code,
    detail: Option<String>,
}

impl EngineError {
    /// Create an error without detail
    pub fn new(code: Code) -> Self {
        Self { code, detail: None }
    }

    /// Create an error carrying a detail string
    pub fn with_detail(code: Code, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: Some(detail.into()),
        }
    }

    /// The failure class
    pub fn code(&self) -> Code {
        self.code
    }

    /// Extra context, if any
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Classify a `reqwest` failure.
    pub(crate) fn from_reqwest(err: &reqwest::Error) -> Self {
        let code = if err.is_timeout() {
            Code::OperationTimedOut
        } else if err.is_redirect() {
            if find_source::<RedirectRefused>(err).is_some() {
                Code::UnsupportedProtocol
            } else {
                Code::TooManyRedirects
            }
        } else if err.is_builder() {
            Code::UrlMalformat
        } else if err.is_connect() {
            classify_connect(err)
        } else if err.is_decode() {
            Code::BadContentEncoding
        } else if err.is_body() || err.is_request() {
            Code::SendError
        } else {
            Code::RecvError
        };
        Self::with_detail(code, source_chain(err))
    }
}

impl From<Code> for EngineError {
    fn from(code: Code) -> Self {
        Self::new(code)
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} ({detail})", self.code),
            None => write!(f, "{}", self.code),
        }
    }
}

impl StdError for EngineError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.code)
    }
}

/// Redirect hop rejected because its scheme is not allowed.
#[derive(Error, Debug)]
#[error("redirect to disallowed scheme `{scheme}`")]
pub(crate) struct RedirectRefused {
    pub(crate) scheme: String,
}

fn classify_connect(err: &reqwest::Error) -> Code {
    let chain = source_chain(err).to_ascii_lowercase();
    if chain.contains("dns") || chain.contains("resolve") || chain.contains("lookup") {
        Code::CouldntResolveHost
    } else if chain.contains("tls") || chain.contains("certificate") || chain.contains("handshake")
    {
        Code::SslConnect
    } else {
        Code::CouldntConnect
    }
}

fn find_source<'a, T: StdError + 'static>(err: &'a (dyn StdError + 'static)) -> Option<&'a T> {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(found) = e.downcast_ref::<T>() {
            return Some(found);
        }
        current = e.source();
    }
    None
}

fn source_chain(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut current = err.source();
    while let Some(e) = current {
        out.push_str(": ");
        out.push_str(&e.to_string());
        current = e.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptions_are_stable() {
        assert_eq!(Code::UnsupportedProtocol.to_string(), "Unsupported protocol");
        assert_eq!(
            Code::AbortedByCallback.to_string(),
            "Operation was aborted by an application callback"
        );
        assert_eq!(
            Code::BadFunctionArgument.to_string(),
            "A libcurl function was given a bad argument"
        );
    }

    #[test]
    fn display_appends_detail() {
        let err = EngineError::with_detail(Code::SendError, "broken pipe");
        assert_eq!(err.to_string(), "Failed sending data to the peer (broken pipe)");
        assert_eq!(err.code(), Code::SendError);
        assert_eq!(err.detail(), Some("broken pipe"));

        let bare: EngineError = Code::UrlMalformat.into();
        assert_eq!(bare.to_string(), "URL using bad/illegal format or missing URL");
        assert!(bare.detail().is_none());
    }

    #[test]
    fn finds_nested_redirect_refusal() {
        #[derive(Error, Debug)]
        #[error("outer")]
        struct Outer(#[source] RedirectRefused);

        let err = Outer(RedirectRefused {
            scheme: "ftp".into(),
        });
        let found = find_source::<RedirectRefused>(&err);
        assert_eq!(found.map(|r| r.scheme.as_str()), Some("ftp"));
        assert_eq!(source_chain(&err), "outer: redirect to disallowed scheme `ftp`");
    }
}
