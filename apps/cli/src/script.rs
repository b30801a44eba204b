//! `pgcurl run`: execute a script of procedure calls

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use pgcurl_sql::{Call, Extension};

/// Arguments of `pgcurl run`
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Script file: a JSON or YAML list of `{ procedure, args }` calls
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Pretty-print each result
    #[arg(long)]
    pub pretty: bool,
}

/// Parse a script; YAML when the extension says so, JSON otherwise.
pub fn load(path: &Path) -> Result<Vec<Call>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read script {}", path.display()))?;
    let calls = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&text)
            .with_context(|| format!("invalid YAML script {}", path.display()))?,
        _ => serde_json::from_str(&text)
            .with_context(|| format!("invalid JSON script {}", path.display()))?,
    };
    Ok(calls)
}

/// Run every call on one session, printing one JSON result per call.
pub async fn run(extension: &Extension, args: &RunArgs) -> Result<()> {
    let calls = load(&args.script)?;
    tracing::debug!(calls = calls.len(), script = %args.script.display(), "running script");

    let mut session = extension.session()?;
    let mut out = std::io::stdout();
    for (index, call) in calls.iter().enumerate() {
        let value = session
            .call(call)
            .await
            .with_context(|| format!("call {} ({}) failed", index + 1, call.procedure))?;
        let line = if args.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        writeln!(out, "{line}")?;
    }
    Ok(())
}
