mod cli;
mod error;
mod output;

use std::process::ExitCode;

use clap::Parser;
use histfill_core::UtcDateTime;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = cli.to_config()?;
    tracing::debug!(?config, "resolved configuration");

    let summary = histfill_core::backfill::run(&config, UtcDateTime::now()).await?;
    output::render(&summary, cli.format, cli.pretty)
}
