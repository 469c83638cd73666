#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Command-line front end of the painting reader.
//!
//! Without a subcommand it starts an interactive shell; `run` processes a
//! batch of images once and exits.

mod config;
mod shell;

use std::process;
use std::sync::Arc;

use anyhow::Context;
use painter_core::Session;

use crate::config::{Cli, Command, ServiceProviders};
use crate::shell::{Shell, repl};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "painter_cli::startup";
pub const TRACING_TARGET_SHELL: &str = "painter_cli::shell";
pub const TRACING_TARGET_CONFIG: &str = "painter_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            error = %error,
            "application terminated with error"
        );
    }
    eprintln!("Error: {error:#}");

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    cli.telemetry
        .validate()
        .context("invalid telemetry configuration")?;
    cli.telemetry.init_tracing();

    cli.validate().context("invalid configuration")?;
    cli.log();

    let prices = cli.pricing.price_table();
    let session = Session::new(prices).with_credentials(cli.credentials.credentials());
    let providers = ServiceProviders::from_cli(&cli)
        .await
        .context("failed to set up providers")?;
    let needs_key = !providers.has_fixture() && session.credentials().openai_api_key.is_none();

    let mut shell = Shell::new(session, Arc::new(providers), cli.provider.concurrency);

    match cli.command.unwrap_or_default() {
        Command::Shell => {
            tracing::info!(
                target: TRACING_TARGET_STARTUP,
                session_id = %shell.session().session_id(),
                "starting interactive shell"
            );
            repl::run_stdio(&mut shell, needs_key).await
        }
        Command::Run(args) => {
            let mut failures = 0;
            for action in args.actions() {
                let reply = shell.dispatch(action).await;
                failures += reply.errors;
                for line in reply.lines() {
                    println!("{line}");
                }
            }

            if failures > 0 {
                anyhow::bail!("{failures} step(s) failed");
            }
            Ok(())
        }
    }
}
