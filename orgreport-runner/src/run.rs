//! Report run
//!
//! One invocation: collect every repository, build the report, publish it.
//! Each stage completes before the next starts, and a failure in any stage
//! ends the run without writing anything.

use std::sync::Arc;

use anyhow::{Context, Result};
use orgreport_core::domain::repository::RepositoryRecord;
use orgreport_core::domain::target::{PublishTarget, RunStamp};
use orgreport_core::kind::ReportKind;
use orgreport_core::report::{Report, ReportBuilder, SortOrder};
use tracing::info;

use crate::config::Config;
use crate::repository::{ContentStore, RepositoryPageSource};
use crate::service::{IdempotentPublisher, PaginatedCollector, PublishOutcome};

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Published(PublishOutcome),
    /// Dry run: the CSV that would have been committed
    Rendered(String),
}

pub struct ReportRun {
    kind: ReportKind,
    sort_column: String,
    sort_order: SortOrder,
    target: PublishTarget,
    message: String,
    dry_run: bool,
    collector: PaginatedCollector,
    publisher: IdempotentPublisher,
}

impl ReportRun {
    /// Wires a run from resolved configuration
    ///
    /// # Arguments
    /// * `config` - resolved configuration
    /// * `stamp` - run timestamp, shared by the artifact path and commit message
    /// * `pages` - repository page source for the organization
    /// * `store` - content store of the target repository
    pub fn new(
        config: &Config,
        stamp: RunStamp,
        pages: Arc<dyn RepositoryPageSource>,
        store: Arc<dyn ContentStore>,
    ) -> Self {
        let kind = config.kind.clone();
        let target = PublishTarget::for_report(
            config.target_owner.clone(),
            config.target_repo.clone(),
            &config.org,
            &stamp,
            &kind.suffix(),
        )
        .on_branch(config.branch.clone());
        let message = format!("{} {}", stamp.date(), kind.title());

        Self {
            kind,
            sort_column: config.sort_column.clone(),
            sort_order: config.sort_order,
            target,
            message,
            dry_run: config.dry_run,
            collector: PaginatedCollector::new(pages),
            publisher: IdempotentPublisher::new(
                store,
                config.committer.clone(),
                config.conflict_policy,
            ),
        }
    }

    pub fn target(&self) -> &PublishTarget {
        &self.target
    }

    pub async fn execute(&self) -> Result<RunOutcome> {
        let collection = self.collector.collect(|record| self.kind.retains(record)).await?;

        let report = self
            .build_report(&collection.records)
            .context("Error creating report")?;
        let csv = report.to_csv();

        if self.dry_run {
            info!("Dry run, skipping publish of {}", self.target);
            return Ok(RunOutcome::Rendered(csv));
        }

        info!("Publishing {} rows to {}", report.rows().len(), self.target);
        let outcome = self
            .publisher
            .publish(&self.target, &self.message, &csv)
            .await
            .context("Error creating report")?;
        Ok(RunOutcome::Published(outcome))
    }

    fn build_report(&self, records: &[RepositoryRecord]) -> Result<Report> {
        let rows = records.iter().map(|record| self.kind.row(record)).collect();
        let report = ReportBuilder::new(self.kind.columns())
            .sort_by(self.sort_column.clone(), self.sort_order)
            .build(rows)?;
        Ok(report)
    }
}
