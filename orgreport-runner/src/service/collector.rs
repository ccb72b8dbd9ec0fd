//! Paginated collector
//!
//! Drives the cursor loop until the source reports no further page. Pages
//! are requested strictly in sequence; each cursor is handed back exactly
//! once. Any failure aborts the whole collection so a partial listing can
//! never reach the publisher.

use std::sync::Arc;

use anyhow::{Context, Result};
use orgreport_core::domain::repository::RepositoryRecord;
use tracing::{debug, info};

use crate::repository::RepositoryPageSource;

/// Result of walking every page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    /// Retained records in server order
    pub records: Vec<RepositoryRecord>,
    /// Pages fetched
    pub pages: usize,
    /// Records seen before filtering
    pub seen: usize,
}

pub struct PaginatedCollector {
    source: Arc<dyn RepositoryPageSource>,
}

impl PaginatedCollector {
    pub fn new(source: Arc<dyn RepositoryPageSource>) -> Self {
        Self { source }
    }

    /// Fetches every page, keeping the records `keep` accepts
    pub async fn collect<F>(&self, keep: F) -> Result<Collection>
    where
        F: Fn(&RepositoryRecord) -> bool + Send + Sync,
    {
        let mut collection = Collection::default();
        let mut cursor = None;

        loop {
            let page = self
                .source
                .fetch_page(cursor)
                .await
                .with_context(|| {
                    format!("Error fetching repositories (page {})", collection.pages + 1)
                })?;

            collection.pages += 1;
            collection.seen += page.items.len();
            debug!(
                "Fetched page {} with {} repositories",
                collection.pages,
                page.items.len()
            );

            collection
                .records
                .extend(page.items.into_iter().filter(|record| keep(record)));

            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        info!(
            "Collected {} of {} repositories across {} page(s)",
            collection.records.len(),
            collection.seen,
            collection.pages
        );
        Ok(collection)
    }
}
