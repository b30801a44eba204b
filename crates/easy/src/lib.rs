//! # pgcurl easy
//!
//! A single configurable HTTP request context driven by textual option and
//! info names. The [`Easy`] context owns at most one request [`Handle`], the
//! header lines attached to it, and the upload/download buffers wired into
//! each transfer. Network behavior (TLS, pooling, redirects, decoding) is
//! delegated to `reqwest`.
//!
//! ```no_run
//! # async fn run() -> pgcurl_easy::Result<()> {
//! use pgcurl_easy::{Easy, InfoString};
//!
//! let mut easy = Easy::new();
//! easy.set_option_string("CURLOPT_URL", "https://example.com/")?;
//! easy.append_header("Accept", "text/html")?;
//! easy.perform().await?;
//!
//! let status = easy.info_long("CURLINFO_RESPONSE_CODE")?;
//! if let InfoString::Body(body) = easy.info_string("CURLINFO_RESPONSE")? {
//!     println!("{status}: {} bytes", body.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod config;
pub mod easy;
pub mod engine;
pub mod error;
pub mod headers;
pub mod info;
pub mod lookup;
pub mod option;

pub use buffer::{DownloadBuffer, SharedUpload, UploadBuffer};
pub use config::EasyConfig;
pub use easy::{Easy, InfoString};
pub use engine::{Code, EasyOpt, EngineError, Handle, MethodMode, TransferInfo};
pub use error::{Error, Result};
pub use headers::HeaderList;
pub use info::{LongInfo, StringInfo};
pub use option::{LongOption, StringOption};

/// Re-exported so hosts can hand in their own cancellation source
pub use tokio_util::sync::CancellationToken;
