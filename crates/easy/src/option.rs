//! Option allow-lists
//!
//! Only the options listed here can be set from the textual interface.
//! Each option declares the parameter type it takes by living in either the
//! string or the integer table. Options whose libcurl name runs words
//! together (`READDATA`) also accept the underscored spelling (`READ_DATA`).

use std::fmt;

use crate::engine::EasyOpt;
use crate::lookup::{self, Entry};

/// Namespace prefix of option names
pub const OPTION_NAMESPACE: &str = "CURLOPT_";

/// Options taking a text parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringOption {
    /// Target URL
    Url,
    /// `User-Agent` header value
    UserAgent,
    /// Accepted content encodings, enabling transparent decoding
    AcceptEncoding,
    /// Request verb sent instead of the method's own
    CustomRequest,
    /// Upload body; handled by the context rather than forwarded
    ReadData,
}

const STRING_OPTIONS: &[Entry<StringOption>] = &[
    Entry { name: "CURLOPT_READDATA", value: StringOption::ReadData },
    Entry { name: "CURLOPT_URL", value: StringOption::Url },
    Entry { name: "CURLOPT_USERAGENT", value: StringOption::UserAgent },
    Entry { name: "CURLOPT_ACCEPT_ENCODING", value: StringOption::AcceptEncoding },
    Entry { name: "CURLOPT_CUSTOMREQUEST", value: StringOption::CustomRequest },
    Entry { name: "CURLOPT_READ_DATA", value: StringOption::ReadData },
    Entry { name: "CURLOPT_USER_AGENT", value: StringOption::UserAgent },
    Entry { name: "CURLOPT_CUSTOM_REQUEST", value: StringOption::CustomRequest },
];

const _: () = assert!(lookup::is_unambiguous(STRING_OPTIONS, OPTION_NAMESPACE));

/// What setting a string option does.
#[derive(Debug)]
pub(crate) enum StringAction {
    /// Forward the value to the engine as-is
    Forward(EasyOpt),
    /// Replace the upload buffer and bind it as the request body
    BindUpload,
}

impl StringOption {
    /// Resolve a textual option name.
    pub fn resolve(name: &str) -> Option<Self> {
        lookup::resolve(STRING_OPTIONS, OPTION_NAMESPACE, name)
    }

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            Self::Url => "CURLOPT_URL",
            Self::UserAgent => "CURLOPT_USERAGENT",
            Self::AcceptEncoding => "CURLOPT_ACCEPT_ENCODING",
            Self::CustomRequest => "CURLOPT_CUSTOMREQUEST",
            Self::ReadData => "CURLOPT_READDATA",
        }
    }

    pub(crate) fn action(self, value: &str) -> StringAction {
        let value = value.to_owned();
        match self {
            Self::Url => StringAction::Forward(EasyOpt::Url(value)),
            Self::UserAgent => StringAction::Forward(EasyOpt::UserAgent(value)),
            Self::AcceptEncoding => StringAction::Forward(EasyOpt::AcceptEncoding(value)),
            Self::CustomRequest => StringAction::Forward(EasyOpt::CustomRequest(value)),
            Self::ReadData => StringAction::BindUpload,
        }
    }
}

impl fmt::Display for StringOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options taking an integer parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LongOption {
    /// Connect phase timeout, seconds
    ConnectTimeout,
    /// Whole-transfer timeout, milliseconds
    TimeoutMs,
    /// Close the connection after the transfer
    ForbidReuse,
    /// Follow `Location` redirects
    FollowLocation,
    /// Redirect limit, `-1` for unlimited
    MaxRedirs,
    /// Switch to POST
    Post,
    /// Declared upload size, `-1` for unknown
    InFileSize,
    /// Switch to HEAD
    NoBody,
}

const LONG_OPTIONS: &[Entry<LongOption>] = &[
    Entry { name: "CURLOPT_CONNECTTIMEOUT", value: LongOption::ConnectTimeout },
    Entry { name: "CURLOPT_TIMEOUT_MS", value: LongOption::TimeoutMs },
    Entry { name: "CURLOPT_FORBID_REUSE", value: LongOption::ForbidReuse },
    Entry { name: "CURLOPT_FOLLOWLOCATION", value: LongOption::FollowLocation },
    Entry { name: "CURLOPT_MAXREDIRS", value: LongOption::MaxRedirs },
    Entry { name: "CURLOPT_POST", value: LongOption::Post },
    Entry { name: "CURLOPT_INFILESIZE", value: LongOption::InFileSize },
    Entry { name: "CURLOPT_NOBODY", value: LongOption::NoBody },
    Entry { name: "CURLOPT_CONNECT_TIMEOUT", value: LongOption::ConnectTimeout },
    Entry { name: "CURLOPT_FOLLOW_LOCATION", value: LongOption::FollowLocation },
    Entry { name: "CURLOPT_MAX_REDIRS", value: LongOption::MaxRedirs },
    Entry { name: "CURLOPT_INFILE_SIZE", value: LongOption::InFileSize },
    Entry { name: "CURLOPT_NO_BODY", value: LongOption::NoBody },
];

const _: () = assert!(lookup::is_unambiguous(LONG_OPTIONS, OPTION_NAMESPACE));

impl LongOption {
    /// Resolve a textual option name.
    pub fn resolve(name: &str) -> Option<Self> {
        lookup::resolve(LONG_OPTIONS, OPTION_NAMESPACE, name)
    }

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            Self::ConnectTimeout => "CURLOPT_CONNECTTIMEOUT",
            Self::TimeoutMs => "CURLOPT_TIMEOUT_MS",
            Self::ForbidReuse => "CURLOPT_FORBID_REUSE",
            Self::FollowLocation => "CURLOPT_FOLLOWLOCATION",
            Self::MaxRedirs => "CURLOPT_MAXREDIRS",
            Self::Post => "CURLOPT_POST",
            Self::InFileSize => "CURLOPT_INFILESIZE",
            Self::NoBody => "CURLOPT_NOBODY",
        }
    }

    /// Engine option for `value`; flags treat any non-zero value as on.
    pub(crate) fn easy_opt(self, value: i64) -> EasyOpt {
        match self {
            Self::ConnectTimeout => EasyOpt::ConnectTimeout(value),
            Self::TimeoutMs => EasyOpt::TimeoutMs(value),
            Self::ForbidReuse => EasyOpt::ForbidReuse(value != 0),
            Self::FollowLocation => EasyOpt::FollowLocation(value != 0),
            Self::MaxRedirs => EasyOpt::MaxRedirs(value),
            Self::Post => EasyOpt::Post(value != 0),
            Self::InFileSize => EasyOpt::InFileSize(value),
            Self::NoBody => EasyOpt::NoBody(value != 0),
        }
    }
}

impl fmt::Display for LongOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("CURLOPT_URL", StringOption::Url)]
    #[case("curlopt_url", StringOption::Url)]
    #[case("Url", StringOption::Url)]
    #[case("CURLOPT_USERAGENT", StringOption::UserAgent)]
    #[case("CurlOpt_UserAgent", StringOption::UserAgent)]
    #[case("accept_encoding", StringOption::AcceptEncoding)]
    #[case("CURLOPT_CUSTOMREQUEST", StringOption::CustomRequest)]
    #[case("CURLOPT_READDATA", StringOption::ReadData)]
    #[case("readdata", StringOption::ReadData)]
    #[case("READ_DATA", StringOption::ReadData)]
    #[case("CURLOPT_READ_DATA", StringOption::ReadData)]
    #[case("USER_AGENT", StringOption::UserAgent)]
    #[case("custom_request", StringOption::CustomRequest)]
    fn resolves_string_options(#[case] input: &str, #[case] expected: StringOption) {
        assert_eq!(StringOption::resolve(input), Some(expected));
    }

    #[rstest]
    #[case("CURLOPT_CONNECTTIMEOUT", LongOption::ConnectTimeout)]
    #[case("connecttimeout", LongOption::ConnectTimeout)]
    #[case("CURLOPT_TIMEOUT_MS", LongOption::TimeoutMs)]
    #[case("curlopt_forbid_reuse", LongOption::ForbidReuse)]
    #[case("FollowLocation", LongOption::FollowLocation)]
    #[case("CURLOPT_MAXREDIRS", LongOption::MaxRedirs)]
    #[case("CURLOPT_POST", LongOption::Post)]
    #[case("CURLOPT_INFILESIZE", LongOption::InFileSize)]
    #[case("nobody", LongOption::NoBody)]
    #[case("CONNECT_TIMEOUT", LongOption::ConnectTimeout)]
    #[case("FOLLOW_LOCATION", LongOption::FollowLocation)]
    #[case("curlopt_max_redirs", LongOption::MaxRedirs)]
    #[case("INFILE_SIZE", LongOption::InFileSize)]
    #[case("No_Body", LongOption::NoBody)]
    fn resolves_long_options(#[case] input: &str, #[case] expected: LongOption) {
        assert_eq!(LongOption::resolve(input), Some(expected));
    }

    #[rstest]
    #[case("CURLOPT_VERBOSE")]
    #[case("CURLOPT_TIMEOUT")]
    #[case("")]
    #[case("CURLOPT_")]
    fn rejects_unlisted_names(#[case] input: &str) {
        assert_eq!(StringOption::resolve(input), None);
        assert_eq!(LongOption::resolve(input), None);
    }

    #[test]
    fn types_do_not_cross_tables() {
        assert_eq!(StringOption::resolve("CURLOPT_POST"), None);
        assert_eq!(LongOption::resolve("CURLOPT_URL"), None);
    }

    #[test]
    fn canonical_names_resolve_to_themselves() {
        for opt in [
            StringOption::Url,
            StringOption::UserAgent,
            StringOption::AcceptEncoding,
            StringOption::CustomRequest,
            StringOption::ReadData,
        ] {
            assert_eq!(StringOption::resolve(opt.name()), Some(opt));
        }
        for opt in [
            LongOption::ConnectTimeout,
            LongOption::TimeoutMs,
            LongOption::ForbidReuse,
            LongOption::FollowLocation,
            LongOption::MaxRedirs,
            LongOption::Post,
            LongOption::InFileSize,
            LongOption::NoBody,
        ] {
            assert_eq!(LongOption::resolve(&opt.to_string()), Some(opt));
        }
    }

    #[test]
    fn flags_treat_nonzero_as_on() {
        assert!(matches!(LongOption::Post.easy_opt(2), EasyOpt::Post(true)));
        assert!(matches!(LongOption::NoBody.easy_opt(0), EasyOpt::NoBody(false)));
        assert!(matches!(LongOption::MaxRedirs.easy_opt(-1), EasyOpt::MaxRedirs(-1)));
    }
}
