use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use authform_cli::{execute, load_settings, Cli};
use authform_core::logging::setup_logging;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref()).context("failed to load settings")?;
    setup_logging(&settings);

    let report = execute(&cli.command, &settings).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(if report.succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
