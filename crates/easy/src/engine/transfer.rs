//! Performing a transfer

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use http::header::{ACCEPT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, HeaderValue, USER_AGENT};
use reqwest::{Body, Request};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use url::Url;

use super::client::EncodingPlan;
use super::{Code, EngineError, Handle, MethodMode, TransferInfo};
use crate::buffer::{DownloadBuffer, upload_stream};
use crate::config::EasyConfig;
use crate::headers::HeaderList;

/// Schemes a transfer or a redirect may use
pub const ALLOWED_PROTOCOLS: &[&str] = &["http", "https"];

/// Everything a transfer borrows from its context.
pub struct Transfer<'a> {
    /// Header lines attached to the request
    pub headers: &'a HeaderList,
    /// Sink for the response body
    pub sink: &'a mut DownloadBuffer,
    /// Aborts the transfer when cancelled
    pub probe: &'a CancellationToken,
    /// Client and stream configuration
    pub config: &'a EasyConfig,
}

impl Handle {
    /// Run the configured request to completion.
    ///
    /// The response body is appended to `transfer.sink`. Any HTTP status
    /// counts as success; only transport failures and cancellation fail.
    pub async fn perform(&mut self, transfer: Transfer<'_>) -> Result<(), EngineError> {
        self.info = TransferInfo::default();
        if transfer.probe.is_cancelled() {
            return Err(Code::AbortedByCallback.into());
        }

        let url = target_url(self.options.url.as_deref())?;
        let client = self.client.get(&self.options, transfer.config)?;
        let request = self.build_request(&client, url, transfer.headers, transfer.config)?;

        let span = tracing::info_span!(
            "transfer",
            method = %request.method(),
            host = request.url().host_str().unwrap_or_default(),
        );
        let Transfer { sink, probe, .. } = transfer;
        let info = &mut self.info;

        async move {
            let mut response = tokio::select! {
                biased;
                () = probe.cancelled() => return Err(Code::AbortedByCallback.into()),
                sent = client.execute(request) => sent.map_err(|e| EngineError::from_reqwest(&e))?,
            };

            info.response_code = i64::from(response.status().as_u16());
            info.content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);

            loop {
                let chunk = tokio::select! {
                    biased;
                    () = probe.cancelled() => return Err(Code::AbortedByCallback.into()),
                    next = response.chunk() => next.map_err(|e| EngineError::from_reqwest(&e))?,
                };
                match chunk {
                    Some(bytes) => {
                        sink.write(&bytes);
                    }
                    None => break,
                }
            }

            tracing::info!(status = info.response_code, bytes = sink.len(), "transfer complete");
            Ok::<(), EngineError>(())
        }
        .instrument(span)
        .await
    }

    fn build_request(
        &self,
        client: &reqwest::Client,
        url: Url,
        lines: &HeaderList,
        config: &EasyConfig,
    ) -> Result<Request, EngineError> {
        let options = &self.options;
        let mut headers = lines.to_header_map()?;

        // Caller-supplied lines take precedence over option-derived headers
        if let Some(agent) = &options.user_agent {
            if !headers.contains_key(USER_AGENT) {
                headers.insert(USER_AGENT, header_value(agent)?);
            }
        }
        let plan = EncodingPlan::from_option(options.accept_encoding.as_deref());
        if let Some(raw) = &plan.raw_header {
            if !headers.contains_key(ACCEPT_ENCODING) {
                headers.insert(ACCEPT_ENCODING, header_value(raw)?);
            }
        }

        let mut builder = client.request(options.wire_method(), url);

        if let Ok(ms) = u64::try_from(options.timeout_ms) {
            if ms > 0 {
                builder = builder.timeout(Duration::from_millis(ms));
            }
        }

        match options.body_source() {
            Some(source) => {
                // Every transfer sends the whole payload; unknown size goes chunked
                if let Ok(len) = u64::try_from(options.infile_size) {
                    headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
                }
                source.lock().rewind();
                let stream = upload_stream(Arc::clone(source), config.upload_chunk_size);
                builder = builder.body(Body::wrap_stream(stream));
            }
            None if options.mode == MethodMode::Post => {
                builder = builder.body(Vec::new());
            }
            None => {}
        }

        builder
            .headers(headers)
            .build()
            .map_err(|e| EngineError::from_reqwest(&e))
    }
}

fn header_value(value: &str) -> Result<HeaderValue, EngineError> {
    HeaderValue::from_str(value)
        .map_err(|_| EngineError::with_detail(Code::BadFunctionArgument, "header value"))
}

/// Parse the target URL, defaulting a missing scheme to `http`.
pub(crate) fn target_url(raw: Option<&str>) -> Result<Url, EngineError> {
    let raw = raw
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(Code::UrlMalformat)?;
    let raw = if raw.contains("://") {
        Cow::Borrowed(raw)
    } else {
        Cow::Owned(format!("http://{raw}"))
    };
    let url = Url::parse(&raw)
        .map_err(|e| EngineError::with_detail(Code::UrlMalformat, e.to_string()))?;
    if !ALLOWED_PROTOCOLS.contains(&url.scheme()) {
        return Err(EngineError::with_detail(
            Code::UnsupportedProtocol,
            url.scheme().to_owned(),
        ));
    }
    Ok(url)
}
