//! Procedure names, call records and result values

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The callable procedures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Procedure {
    /// `easy_init() -> bool`
    EasyInit,
    /// `easy_reset()`
    EasyReset,
    /// `easy_cleanup()`
    EasyCleanup,
    /// `append_header(name, value) -> bool`
    AppendHeader,
    /// `set_option_string(option, value) -> bool`
    SetOptionString,
    /// `set_option_long(option, value) -> bool`
    SetOptionLong,
    /// `perform() -> bool`
    Perform,
    /// `get_info_string(info) -> text`
    GetInfoString,
    /// `get_info_long(info) -> bigint`
    GetInfoLong,
}

impl Procedure {
    /// Every procedure, in declaration order
    pub const ALL: [Self; 9] = [
        Self::EasyInit,
        Self::EasyReset,
        Self::EasyCleanup,
        Self::AppendHeader,
        Self::SetOptionString,
        Self::SetOptionLong,
        Self::Perform,
        Self::GetInfoString,
        Self::GetInfoLong,
    ];

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            Self::EasyInit => "easy_init",
            Self::EasyReset => "easy_reset",
            Self::EasyCleanup => "easy_cleanup",
            Self::AppendHeader => "append_header",
            Self::SetOptionString => "set_option_string",
            Self::SetOptionLong => "set_option_long",
            Self::Perform => "perform",
            Self::GetInfoString => "get_info_string",
            Self::GetInfoLong => "get_info_long",
        }
    }

    /// Name the procedure is registered under in SQL
    pub fn sql_name(self) -> &'static str {
        match self {
            Self::EasyInit => "curl_easy_init",
            Self::EasyReset => "curl_easy_reset",
            Self::EasyCleanup => "curl_easy_cleanup",
            Self::AppendHeader => "curl_slist_append",
            Self::SetOptionString => "curl_easy_setopt_char",
            Self::SetOptionLong => "curl_easy_setopt_long",
            Self::Perform => "curl_easy_perform",
            Self::GetInfoString => "curl_easy_getinfo_char",
            Self::GetInfoLong => "curl_easy_getinfo_long",
        }
    }

    /// Number of arguments the procedure takes
    pub fn arity(self) -> usize {
        match self {
            Self::EasyInit | Self::EasyReset | Self::EasyCleanup | Self::Perform => 0,
            Self::GetInfoString | Self::GetInfoLong => 1,
            Self::AppendHeader | Self::SetOptionString | Self::SetOptionLong => 2,
        }
    }
}

impl FromStr for Procedure {
    type Err = Error;

    /// Either name, compared case-insensitively like SQL identifiers.
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| s.eq_ignore_ascii_case(p.name()) || s.eq_ignore_ascii_case(p.sql_name()))
            .ok_or_else(|| Error::UnknownProcedure { name: s.to_owned() })
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A SQL value passed to or returned from a procedure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// `boolean`
    Bool(bool),
    /// `bigint`
    Int(i64),
    /// `text`
    Text(String),
    /// SQL `NULL`
    Null,
    /// Result of a `void` procedure
    Void,
}

impl Value {
    /// Text argument; `NULL` maps to `None`
    pub(crate) fn as_text(&self, procedure: Procedure, position: usize) -> Result<Option<&str>> {
        match self {
            Self::Text(s) => Ok(Some(s)),
            Self::Null => Ok(None),
            other => Err(mismatch(procedure, position, "text", other)),
        }
    }

    /// Integer argument; `NULL` maps to `None`
    pub(crate) fn as_int(&self, procedure: Procedure, position: usize) -> Result<Option<i64>> {
        match self {
            Self::Int(n) => Ok(Some(*n)),
            Self::Null => Ok(None),
            other => Err(mismatch(procedure, position, "bigint", other)),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Int(_) => "bigint",
            Self::Text(_) => "text",
            Self::Null => "null",
            Self::Void => "void",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<Option<String>> for Value {
    fn from(v: Option<String>) -> Self {
        v.map_or(Self::Null, Self::Text)
    }
}

fn mismatch(procedure: Procedure, position: usize, expected: &str, got: &Value) -> Error {
    Error::InvalidArguments {
        procedure: procedure.name(),
        message: format!(
            "argument {} must be {expected}, got {}",
            position + 1,
            got.type_name()
        ),
    }
}

/// One named procedure call, as read from a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// Procedure name or SQL alias
    pub procedure: String,
    /// Positional arguments
    #[serde(default)]
    pub args: Vec<Value>,
}

impl Call {
    /// Call `procedure` with `args`
    pub fn new(procedure: Procedure, args: impl IntoIterator<Item = Value>) -> Self {
        Self {
            procedure: procedure.name().to_owned(),
            args: args.into_iter().collect(),
        }
    }

    /// Resolve the procedure and check the argument count.
    pub fn resolve(&self) -> Result<Procedure> {
        let procedure: Procedure = self.procedure.parse()?;
        if self.args.len() != procedure.arity() {
            return Err(Error::InvalidArguments {
                procedure: procedure.name(),
                message: format!(
                    "expected {} arguments, got {}",
                    procedure.arity(),
                    self.args.len()
                ),
            });
        }
        Ok(procedure)
    }
}
