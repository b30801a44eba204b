//! # pgcurl sql
//!
//! The callable-procedure surface over [`pgcurl_easy`].
//!
//! A host loads one [`Extension`] per process and opens one [`Session`] per
//! caller connection. Procedures take SQL-nullable arguments and are
//! reachable either as methods or by name through [`Session::call`].

pub mod error;
pub mod extension;
pub mod procedure;
pub mod session;

pub use error::{Error, Result};
pub use extension::{Extension, ExtensionConfig, Interrupt};
pub use procedure::{Call, Procedure, Value};
pub use session::Session;
