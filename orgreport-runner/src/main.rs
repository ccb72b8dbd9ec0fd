//! Orgreport
//!
//! Reports on every repository of a GitHub organization and commits the
//! result as a CSV file to a repository.
//!
//! Architecture:
//! - Configuration: flags and `INPUT_*` variables, resolved with the event payload
//! - Repositories: GitHub page source and content store
//! - Services: paginated collection and idempotent publishing
//! - Run: collect, build and publish, strictly in that order

mod config;
mod event;
mod repository;
mod run;
mod service;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use orgreport_client::{GitHubClient, RateLimitedTransport, ReqwestTransport};
use orgreport_core::domain::target::RunStamp;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Args, Config};
use crate::event::EventPayload;
use crate::repository::{GitHubContentStore, GitHubPageSource};
use crate::run::{ReportRun, RunOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so a dry run's stdout is just the CSV
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orgreport_runner=info,orgreport_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let stamp = RunStamp::capture();
    info!("Starting orgreport");

    let config = load_config()?;
    info!(
        "Loaded configuration: org={}, target={}/{}, page_size={}",
        config.org, config.target_owner, config.target_repo, config.page_size
    );

    let transport = RateLimitedTransport::with_policy(
        ReqwestTransport::new(config.token.clone()).context("Failed to build HTTP client")?,
        config.retry_policy.clone(),
    );
    let client = Arc::new(GitHubClient::with_transport(
        config.api_url.clone(),
        config.graphql_url.clone(),
        Arc::new(transport),
    ));

    let pages = Arc::new(GitHubPageSource::new(
        client.clone(),
        config.kind.clone(),
        config.org.clone(),
        config.page_size,
    ));
    let store = Arc::new(GitHubContentStore::new(client));

    let run = ReportRun::new(&config, stamp, pages, store);
    info!("Report target: {}", run.target());

    match run.execute().await {
        Ok(RunOutcome::Published(outcome)) => {
            let verb = if outcome.replaced { "replaced" } else { "committed" };
            info!(
                "Report {} at {} ({})",
                verb,
                outcome.path,
                outcome.html_url.as_deref().unwrap_or(&outcome.commit_sha)
            );
            Ok(())
        }
        Ok(RunOutcome::Rendered(csv)) => {
            print!("{}", csv);
            Ok(())
        }
        Err(e) => {
            error!("{:#}", e);
            Err(e)
        }
    }
}

/// Parses arguments and resolves them against the workflow event, if any
fn load_config() -> Result<Config> {
    let args = Args::parse();
    let event = match &args.event_path {
        Some(path) => EventPayload::load(path)?,
        None => None,
    };
    Config::resolve(args, event.as_ref())
}
