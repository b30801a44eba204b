//! Per-caller session exposing the callable procedures

use pgcurl_easy::{Easy, InfoString};
use tracing::debug;

use crate::error::{Error, Result};
use crate::extension::Interrupt;
use crate::procedure::{Call, Procedure, Value};

/// One caller's context plus the shared interrupt source.
///
/// Arguments are SQL-nullable: a `None` fails with
/// [`Error::MissingArgument`] before the context is touched.
#[derive(Debug)]
pub struct Session {
    easy: Easy,
    interrupt: Interrupt,
}

impl Session {
    /// Wrap a context
    pub fn new(easy: Easy, interrupt: Interrupt) -> Self {
        Self { easy, interrupt }
    }

    /// The underlying context
    pub fn easy(&self) -> &Easy {
        &self.easy
    }

    /// `easy_init() -> bool`
    pub fn easy_init(&mut self) -> bool {
        self.easy.init()
    }

    /// `easy_reset()`
    pub fn easy_reset(&mut self) {
        self.easy.reset();
    }

    /// `easy_cleanup()`
    pub fn easy_cleanup(&mut self) {
        self.easy.cleanup();
    }

    /// `append_header(name, value) -> bool`
    pub fn append_header(&mut self, name: Option<&str>, value: Option<&str>) -> Result<bool> {
        let name = required(Procedure::AppendHeader, "name", name)?;
        let value = required(Procedure::AppendHeader, "value", value)?;
        Ok(self.easy.append_header(name, value)?)
    }

    /// `set_option_string(option, value) -> bool`
    pub fn set_option_string(&mut self, option: Option<&str>, value: Option<&str>) -> Result<bool> {
        let option = required(Procedure::SetOptionString, "option", option)?;
        let value = required(Procedure::SetOptionString, "value", value)?;
        Ok(self.easy.set_option_string(option, value)?)
    }

    /// `set_option_long(option, value) -> bool`
    pub fn set_option_long(&mut self, option: Option<&str>, value: Option<i64>) -> Result<bool> {
        let option = required(Procedure::SetOptionLong, "option", option)?;
        let value = required(Procedure::SetOptionLong, "value", value)?;
        Ok(self.easy.set_option_long(option, value)?)
    }

    /// `perform() -> bool`
    ///
    /// Watches the interrupt token current when the call starts.
    pub async fn perform(&mut self) -> Result<bool> {
        let probe = self.interrupt.current();
        Ok(self.easy.perform_until(&probe).await?)
    }

    /// `get_info_string(info) -> text`
    ///
    /// The response body must be valid UTF-8 to come back as text.
    pub fn get_info_string(&self, info: Option<&str>) -> Result<Option<String>> {
        let name = required(Procedure::GetInfoString, "info", info)?;
        match self.easy.info_string(name)? {
            InfoString::Body(bytes) => std::str::from_utf8(bytes)
                .map(|text| Some(text.to_owned()))
                .map_err(|_| Error::InvalidText {
                    info: name.to_owned(),
                }),
            InfoString::Metadata(value) => Ok(value.map(str::to_owned)),
        }
    }

    /// `get_info_long(info) -> bigint`
    pub fn get_info_long(&self, info: Option<&str>) -> Result<i64> {
        let name = required(Procedure::GetInfoLong, "info", info)?;
        Ok(self.easy.info_long(name)?)
    }

    /// Dispatch a named call.
    pub async fn call(&mut self, call: &Call) -> Result<Value> {
        let procedure = call.resolve()?;
        debug!(%procedure, "call");
        let text = |i: usize| call.args[i].as_text(procedure, i);
        let int = |i: usize| call.args[i].as_int(procedure, i);

        Ok(match procedure {
            Procedure::EasyInit => self.easy_init().into(),
            Procedure::EasyReset => {
                self.easy_reset();
                Value::Void
            }
            Procedure::EasyCleanup => {
                self.easy_cleanup();
                Value::Void
            }
            Procedure::AppendHeader => self.append_header(text(0)?, text(1)?)?.into(),
            Procedure::SetOptionString => self.set_option_string(text(0)?, text(1)?)?.into(),
            Procedure::SetOptionLong => self.set_option_long(text(0)?, int(1)?)?.into(),
            Procedure::Perform => self.perform().await?.into(),
            Procedure::GetInfoString => self.get_info_string(text(0)?)?.into(),
            Procedure::GetInfoLong => self.get_info_long(text(0)?)?.into(),
        })
    }
}

fn required<T>(procedure: Procedure, argument: &'static str, value: Option<T>) -> Result<T> {
    value.ok_or(Error::MissingArgument {
        procedure: procedure.name(),
        argument,
    })
}
