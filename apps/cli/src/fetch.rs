//! `pgcurl fetch`: one transfer from command-line flags

use std::io::Write;

use anyhow::{Context, Result, bail};
use clap::Args;
use pgcurl_sql::{Call, Extension, Procedure, Value};

/// Arguments of `pgcurl fetch`
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Target URL (http or https)
    #[arg(value_name = "URL")]
    pub url: String,

    /// Extra header, `Name: value`; repeatable
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Request method sent instead of the default
    #[arg(short = 'X', long = "request", value_name = "METHOD")]
    pub method: Option<String>,

    /// Request body; switches to POST
    #[arg(short = 'd', long = "data", value_name = "DATA")]
    pub data: Option<String>,

    /// Follow redirects
    #[arg(short = 'L', long)]
    pub follow: bool,

    /// Whole-transfer timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<i64>,

    /// Print `HTTP <status>` before the body
    #[arg(short = 'i', long)]
    pub include_status: bool,
}

impl FetchArgs {
    /// The procedure calls equivalent to these flags, ending with `perform`.
    pub fn calls(&self) -> Result<Vec<Call>> {
        let text = |s: &str| Value::Text(s.to_owned());
        let mut calls = vec![Call::new(Procedure::SetOptionString, [
            text("CURLOPT_URL"),
            text(&self.url),
        ])];

        for line in &self.headers {
            let Some((name, value)) = line.split_once(':') else {
                bail!("header `{line}` is not `Name: value`");
            };
            calls.push(Call::new(Procedure::AppendHeader, [
                text(name.trim()),
                text(value.trim()),
            ]));
        }
        if let Some(data) = &self.data {
            calls.push(Call::new(Procedure::SetOptionString, [
                text("CURLOPT_READDATA"),
                text(data),
            ]));
            calls.push(Call::new(Procedure::SetOptionLong, [
                text("CURLOPT_POST"),
                Value::Int(1),
            ]));
        }
        if let Some(method) = &self.method {
            calls.push(Call::new(Procedure::SetOptionString, [
                text("CURLOPT_CUSTOMREQUEST"),
                text(method),
            ]));
        }
        if self.follow {
            calls.push(Call::new(Procedure::SetOptionLong, [
                text("CURLOPT_FOLLOWLOCATION"),
                Value::Int(1),
            ]));
        }
        if let Some(ms) = self.timeout_ms {
            calls.push(Call::new(Procedure::SetOptionLong, [
                text("CURLOPT_TIMEOUT_MS"),
                Value::Int(ms),
            ]));
        }
        calls.push(Call::new(Procedure::Perform, []));
        Ok(calls)
    }
}

/// Perform the transfer and write the raw body to stdout.
pub async fn run(extension: &Extension, args: &FetchArgs) -> Result<()> {
    let calls = args.calls()?;
    let mut session = extension.session()?;
    for call in &calls {
        session
            .call(call)
            .await
            .with_context(|| format!("{} failed", call.procedure))?;
    }

    let status = session.get_info_long(Some("CURLINFO_RESPONSE_CODE"))?;
    tracing::debug!(status, url = %args.url, "fetch complete");

    let mut out = std::io::stdout().lock();
    if args.include_status {
        writeln!(out, "HTTP {status}")?;
    }
    out.write_all(session.easy().response()?)?;
    out.flush()?;
    Ok(())
}
