//! webmcp-registry - command-line entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use webmcp_registry::cli::{Cli, run_command};
use webmcp_registry::settings::RegistrySettings;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let settings = RegistrySettings::from_env()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    // Logs go to stderr; stdout carries the JSON result.
    if cli.log_json || settings.log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .init();
    }

    let output = run_command(cli.command, &settings)?;
    println!("{}", serde_json::to_string_pretty(&output.body)?);

    Ok(if output.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
