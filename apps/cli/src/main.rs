//! `pgcurl`: drive the procedure surface from the command line

mod config;
mod fetch;
mod script;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pgcurl_sql::Extension;

use crate::config::HostConfig;
use crate::fetch::FetchArgs;
use crate::script::RunArgs;

/// HTTP transfers through the pgcurl procedure surface
#[derive(Parser, Debug)]
#[command(name = "pgcurl", version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML or YAML); defaults to ./pgcurl.toml when present
    #[arg(long, global = true, env = "PGCURL_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log filter directive, e.g. `debug` or `pgcurl_easy=trace`
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    /// Log output format: pretty, compact or json
    #[arg(long, global = true, value_name = "FORMAT")]
    log_format: Option<pgcurl_log::Format>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a JSON or YAML script of procedure calls
    Run(RunArgs),
    /// Perform a single transfer and print the body
    Fetch(FetchArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = HostConfig::load(cli.config.as_deref())?
        .with_log_overrides(cli.log_level, cli.log_format);
    let _guard = pgcurl_log::init_with(config.log.clone()).context("failed to set up logging")?;

    let extension = Extension::load(config.extension()).context("failed to load extension")?;
    let result = match &cli.command {
        Command::Run(args) => script::run(&extension, args).await,
        Command::Fetch(args) => fetch::run(&extension, args).await,
    };
    extension.unload();
    result
}
