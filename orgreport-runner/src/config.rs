//! Runner configuration
//!
//! Inputs arrive as command-line flags or the environment variables GitHub
//! Actions derives from `with:` inputs (`INPUT_*`). They are resolved once,
//! together with the workflow event payload, into an immutable [`Config`].

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use orgreport_client::{GitHubClient, RetryPolicy};
use orgreport_core::domain::target::Committer;
use orgreport_core::kind::{NAME_COLUMN, ReportKind};
use orgreport_core::predicate::{FileExistencePredicate, TemplateLineagePredicate};
use orgreport_core::report::SortOrder;

use crate::event::EventPayload;
use crate::service::ConflictPolicy;

/// Largest page the GraphQL connection accepts
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl From<SortDirection> for SortOrder {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => SortOrder::Ascending,
            SortDirection::Desc => SortOrder::Descending,
        }
    }
}

#[derive(Parser)]
#[command(name = "orgreport")]
#[command(about = "Organization repository report generator", long_about = None)]
pub struct Args {
    /// GitHub token with read access to the organization and write access to the target repository
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Organization login (defaults to the event's organization)
    #[arg(long, env = "INPUT_ORG")]
    pub org: Option<String>,

    /// Column to sort by, as key or header label
    #[arg(long, env = "INPUT_SORT", default_value = NAME_COLUMN)]
    pub sort: String,

    #[arg(long, env = "INPUT_SORT-ORDER", value_enum, default_value_t = SortDirection::Asc)]
    pub sort_order: SortDirection,

    #[arg(long, env = "INPUT_COMMITTER-NAME", default_value = Committer::DEFAULT_NAME)]
    pub committer_name: String,

    #[arg(long, env = "INPUT_COMMITTER-EMAIL", default_value = Committer::DEFAULT_EMAIL)]
    pub committer_email: String,

    /// Template repository (owner/repo); switches to the template lineage report
    #[arg(long, env = "INPUT_TEMPLATE")]
    pub template: Option<String>,

    /// Git ref inspected by the file presence report
    #[arg(long, env = "INPUT_FILE-REF", default_value = FileExistencePredicate::DEFAULT_REFERENCE)]
    pub file_ref: String,

    /// Path inspected by the file presence report
    #[arg(long, env = "INPUT_FILE-PATH", default_value = FileExistencePredicate::DEFAULT_PATH)]
    pub file_path: String,

    /// Repository receiving the report (owner/repo)
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// Branch receiving the report (defaults to the repository's default branch)
    #[arg(long, env = "INPUT_BRANCH")]
    pub branch: Option<String>,

    /// What to do when the report path already exists
    #[arg(long, env = "INPUT_CONFLICT-POLICY", value_enum, default_value_t = ConflictPolicy::Fail)]
    pub conflict_policy: ConflictPolicy,

    /// Repositories per GraphQL page (1-100)
    #[arg(long, env = "INPUT_PAGE-SIZE", default_value_t = 10)]
    pub page_size: u32,

    /// Retries for network failures and server errors
    #[arg(long, env = "INPUT_MAX-RETRIES", default_value_t = RetryPolicy::DEFAULT_TRANSIENT_RETRIES)]
    pub max_retries: u32,

    /// Seconds between retries of network failures and server errors
    #[arg(long, env = "INPUT_RETRY-SPACING", default_value_t = RetryPolicy::DEFAULT_TRANSIENT_SPACING.as_secs())]
    pub retry_spacing: u64,

    #[arg(long, env = "GITHUB_API_URL", default_value = GitHubClient::DEFAULT_API_URL)]
    pub api_url: String,

    #[arg(long, env = "GITHUB_GRAPHQL_URL", default_value = GitHubClient::DEFAULT_GRAPHQL_URL)]
    pub graphql_url: String,

    /// Workflow event payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,

    /// Print the report to stdout instead of committing it
    #[arg(long)]
    pub dry_run: bool,
}

/// Resolved runner configuration
#[derive(Clone)]
pub struct Config {
    pub token: String,

    /// Organization whose repositories are reported on
    pub org: String,

    /// Owner of the repository receiving the report
    pub target_owner: String,
    pub target_repo: String,
    pub branch: Option<String>,

    pub kind: ReportKind,
    pub sort_column: String,
    pub sort_order: SortOrder,

    pub committer: Committer,
    pub conflict_policy: ConflictPolicy,
    pub page_size: u32,
    pub retry_policy: RetryPolicy,

    pub api_url: String,
    pub graphql_url: String,

    pub dry_run: bool,
}

impl Config {
    /// Resolves arguments against the event payload and validates the result
    ///
    /// Explicit inputs win; the event fills in the organization and target
    /// repository when they are absent. Empty values count as absent.
    pub fn resolve(args: Args, event: Option<&EventPayload>) -> Result<Self> {
        let org = non_empty(args.org)
            .or_else(|| event.and_then(EventPayload::organization_login).map(str::to_string))
            .context("No organization given and the event payload has none")?;

        let repository = non_empty(args.repository)
            .or_else(|| event.and_then(EventPayload::repository_full_name))
            .context("No target repository given and the event payload has none")?;
        let (target_owner, target_repo) = split_repository(&repository)?;

        let kind = match non_empty(args.template) {
            Some(template) => ReportKind::TemplateLineage(TemplateLineagePredicate::new(template)),
            None => ReportKind::FilePresence(FileExistencePredicate::new(args.file_ref, args.file_path)),
        };

        let config = Self {
            token: args.token,
            org,
            target_owner,
            target_repo,
            branch: non_empty(args.branch),
            kind,
            sort_column: non_empty(Some(args.sort)).unwrap_or_else(|| NAME_COLUMN.to_string()),
            sort_order: args.sort_order.into(),
            committer: Committer::new(
                non_empty(Some(args.committer_name))
                    .unwrap_or_else(|| Committer::DEFAULT_NAME.to_string()),
                non_empty(Some(args.committer_email))
                    .unwrap_or_else(|| Committer::DEFAULT_EMAIL.to_string()),
            ),
            conflict_policy: args.conflict_policy,
            page_size: args.page_size,
            retry_policy: RetryPolicy::new(args.max_retries, Duration::from_secs(args.retry_spacing)),
            api_url: args.api_url,
            graphql_url: args.graphql_url,
            dry_run: args.dry_run,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            anyhow::bail!("token cannot be empty");
        }

        if self.org.trim().is_empty() {
            anyhow::bail!("org cannot be empty");
        }

        if self.target_owner.is_empty() || self.target_repo.is_empty() {
            anyhow::bail!("target repository must be in owner/repo form");
        }

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            anyhow::bail!("page_size must be between 1 and {}", MAX_PAGE_SIZE);
        }

        for (name, url) in [("api_url", &self.api_url), ("graphql_url", &self.graphql_url)] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
        }

        if let ReportKind::TemplateLineage(predicate) = &self.kind {
            split_repository(&predicate.template).context("template must be in owner/repo form")?;
        }

        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("org", &self.org)
            .field("target_owner", &self.target_owner)
            .field("target_repo", &self.target_repo)
            .field("branch", &self.branch)
            .field("kind", &self.kind)
            .field("sort_column", &self.sort_column)
            .field("sort_order", &self.sort_order)
            .field("committer", &self.committer)
            .field("conflict_policy", &self.conflict_policy)
            .field("page_size", &self.page_size)
            .field("retry_policy", &self.retry_policy)
            .field("api_url", &self.api_url)
            .field("graphql_url", &self.graphql_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_repository(full_name: &str) -> Result<(String, String)> {
    match full_name.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => anyhow::bail!("'{}' is not in owner/repo form", full_name),
    }
}
