//! Pooled `reqwest` client, rebuilt only when client-level options change

use std::time::Duration;

use reqwest::redirect::Policy;
use reqwest::{Client as ReqwestClient, ClientBuilder as ReqwestClientBuilder};

use super::code::{Code, EngineError, RedirectRefused};
use super::transfer::ALLOWED_PROTOCOLS;
use super::HandleOptions;
use crate::config::EasyConfig;

/// Transparent decoders enabled on the client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Decoders {
    pub(crate) gzip: bool,
    pub(crate) brotli: bool,
    pub(crate) deflate: bool,
}

impl Decoders {
    const ALL: Self = Self {
        gzip: true,
        brotli: true,
        deflate: true,
    };

    fn any(self) -> bool {
        self.gzip || self.brotli || self.deflate
    }
}

/// How an `Accept-Encoding` option value is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EncodingPlan {
    pub(crate) decoders: Decoders,
    /// Header sent verbatim when no listed encoding can be decoded
    pub(crate) raw_header: Option<String>,
}

impl EncodingPlan {
    pub(crate) fn from_option(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self {
                decoders: Decoders::default(),
                raw_header: None,
            };
        };
        if value.trim().is_empty() {
            return Self {
                decoders: Decoders::ALL,
                raw_header: None,
            };
        }

        let mut decoders = Decoders::default();
        for token in value.split(',') {
            // Drop any quality parameter.
            let token = token.split(';').next().unwrap_or_default().trim();
            if token.eq_ignore_ascii_case("gzip") || token.eq_ignore_ascii_case("x-gzip") {
                decoders.gzip = true;
            } else if token.eq_ignore_ascii_case("br") {
                decoders.brotli = true;
            } else if token.eq_ignore_ascii_case("deflate") {
                decoders.deflate = true;
            }
        }

        if decoders.any() {
            Self {
                decoders,
                raw_header: None,
            }
        } else {
            Self {
                decoders,
                raw_header: Some(value.to_owned()),
            }
        }
    }
}

/// Options that live on the client rather than on a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClientSettings {
    connect_timeout: Duration,
    follow_location: bool,
    max_redirs: i64,
    forbid_reuse: bool,
    decoders: Decoders,
}

impl ClientSettings {
    pub(crate) fn from_options(options: &HandleOptions, config: &EasyConfig) -> Self {
        let connect_timeout = match u64::try_from(options.connect_timeout) {
            Ok(0) | Err(_) => config.default_connect_timeout(),
            Ok(secs) => Duration::from_secs(secs),
        };
        Self {
            connect_timeout,
            follow_location: options.follow_location,
            max_redirs: options.max_redirs,
            forbid_reuse: options.forbid_reuse,
            decoders: EncodingPlan::from_option(options.accept_encoding.as_deref()).decoders,
        }
    }

    fn build(&self, config: &EasyConfig) -> Result<ReqwestClient, EngineError> {
        let mut builder = ReqwestClientBuilder::new();

        // Set timeouts and pooling
        builder = builder
            .connect_timeout(self.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout())
            .tcp_keepalive(config.tcp_keepalive());
        builder = if self.forbid_reuse {
            builder.pool_max_idle_per_host(0)
        } else {
            builder.pool_max_idle_per_host(config.pool_max_idle_per_host)
        };

        // Set redirect policy
        builder = builder.redirect(redirect_policy(self.follow_location, self.max_redirs));

        // Set transparent decoding
        builder = builder
            .gzip(self.decoders.gzip)
            .brotli(self.decoders.brotli)
            .deflate(self.decoders.deflate);

        builder
            .build()
            .map_err(|e| EngineError::with_detail(Code::FailedInit, e.to_string()))
    }
}

fn redirect_policy(follow: bool, max_redirs: i64) -> Policy {
    if !follow {
        return Policy::none();
    }
    let limit = usize::try_from(max_redirs).ok();
    Policy::custom(move |attempt| {
        let scheme = attempt.url().scheme().to_owned();
        if !ALLOWED_PROTOCOLS.contains(&scheme.as_str()) {
            return attempt.error(RedirectRefused { scheme });
        }
        // `previous` holds the original URL plus every hop already taken.
        match limit {
            Some(max) if attempt.previous().len() > max => {
                attempt.error(format!("maximum ({max}) redirects followed"))
            }
            _ => attempt.follow(),
        }
    })
}

/// A client together with the settings it was built from.
pub(crate) struct CachedClient {
    settings: ClientSettings,
    client: ReqwestClient,
}

impl CachedClient {
    pub(crate) fn build(options: &HandleOptions, config: &EasyConfig) -> Result<Self, EngineError> {
        let settings = ClientSettings::from_options(options, config);
        let client = settings.build(config)?;
        Ok(Self { settings, client })
    }

    /// Client matching `options`, rebuilding when the client-level settings
    /// differ from the cached ones.
    pub(crate) fn get(
        &mut self,
        options: &HandleOptions,
        config: &EasyConfig,
    ) -> Result<ReqwestClient, EngineError> {
        let settings = ClientSettings::from_options(options, config);
        if settings != self.settings {
            tracing::debug!(?settings, "rebuilding HTTP client");
            self.client = settings.build(config)?;
            self.settings = settings;
        }
        Ok(self.client.clone())
    }
}
