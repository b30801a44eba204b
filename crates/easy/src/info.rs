//! Info allow-lists

use std::fmt;

use crate::lookup::{self, Entry};

/// Namespace prefix of info names
pub const INFO_NAMESPACE: &str = "CURLINFO_";

/// Text-valued info
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringInfo {
    /// Raw response body, served from the download buffer
    Response,
    /// `Content-Type` of the last response
    ContentType,
}

const STRING_INFO: &[Entry<StringInfo>] = &[
    Entry { name: "CURLINFO_RESPONSE", value: StringInfo::Response },
    Entry { name: "CURLINFO_CONTENT_TYPE", value: StringInfo::ContentType },
];

const _: () = assert!(lookup::is_unambiguous(STRING_INFO, INFO_NAMESPACE));

impl StringInfo {
    /// Resolve a textual info name.
    ///
    /// `CURLINFO_RESPONSE` is checked first, so any name starting with it
    /// (including `CURLINFO_RESPONSE_CODE`) selects the body.
    pub fn resolve(name: &str) -> Option<Self> {
        lookup::resolve(STRING_INFO, INFO_NAMESPACE, name)
    }

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            Self::Response => "CURLINFO_RESPONSE",
            Self::ContentType => "CURLINFO_CONTENT_TYPE",
        }
    }
}

impl fmt::Display for StringInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Integer-valued info
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LongInfo {
    /// HTTP status of the last response, `0` before any
    ResponseCode,
}

const LONG_INFO: &[Entry<LongInfo>] = &[Entry {
    name: "CURLINFO_RESPONSE_CODE",
    value: LongInfo::ResponseCode,
}];

const _: () = assert!(lookup::is_unambiguous(LONG_INFO, INFO_NAMESPACE));

impl LongInfo {
    /// Resolve a textual info name.
    pub fn resolve(name: &str) -> Option<Self> {
        lookup::resolve(LONG_INFO, INFO_NAMESPACE, name)
    }

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            Self::ResponseCode => "CURLINFO_RESPONSE_CODE",
        }
    }
}

impl fmt::Display for LongInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
