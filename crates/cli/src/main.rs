//! `steward`: reconciles a GitHub organization with a YAML manifest.
//!
//! This binary is the composition root. It parses arguments, installs
//! logging, builds the GitHub gateway and hands the manifest to the
//! organization reconciler. Reconciliation logic lives in `reconciler`; HTTP
//! lives in `github`.
//!
//! Ctrl-C and `--timeout` cancel the gateway, which aborts the run at its next
//! request. Writes already issued stay applied.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use github::{GatewayConfig, GithubGateway, RateLimiter};
use reconciler::OrganizationReconciler;

mod cli;
mod manifest;
mod render;
mod telemetry;

use cli::Cli;
use render::TerminalReporter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = match telemetry::init(cli.log_format) {
        Ok(telemetry) => telemetry,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    let result = run(cli).await;
    telemetry.shutdown();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let invocation = cli
        .command
        .invocation()
        .context("no manifest given")?;
    let org = manifest::load(invocation.manifest)?;

    let limiter = RateLimiter::new(cli.requests_per_second, cli.burst)
        .context("invalid rate limit")?;
    let mut config = GatewayConfig::for_base_url(&cli.api_url).with_page_size(cli.page_size);
    match &cli.token {
        Some(token) => config = config.with_token(token.as_str()),
        None => warn!("no GitHub token given; requests are unauthenticated"),
    }
    let gateway = GithubGateway::new(config, limiter).context("failed to configure GitHub client")?;
    watch_for_cancellation(
        gateway.cancellation_token(),
        cli.timeout.map(Duration::from_secs),
    );

    info!(
        org = %org.name,
        mode = %invocation.mode,
        manifest = %invocation.manifest.display(),
        "starting reconciliation"
    );

    let mut reporter = TerminalReporter::stdout();
    let summary = OrganizationReconciler::new(Arc::new(gateway), invocation.mode)
        .run(&org, &invocation.sections, &mut reporter)
        .await?;
    reporter.finish(&summary);

    Ok(())
}

/// Cancels `token` on Ctrl-C or once `deadline` elapses.
fn watch_for_cancellation(token: CancellationToken, deadline: Option<Duration>) {
    tokio::spawn(async move {
        let timeout = async {
            match deadline {
                Some(deadline) => tokio::time::sleep(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => warn!("interrupted, cancelling run"),
            _ = timeout => warn!("timeout reached, cancelling run"),
            _ = token.cancelled() => return,
        }
        token.cancel();
    });
}
