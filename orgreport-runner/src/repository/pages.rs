//! Repository page source
//!
//! Fetches successive pages of an organization's repositories.

use std::sync::Arc;

use async_trait::async_trait;
use orgreport_client::{GitHubClient, Result};
use orgreport_core::domain::page::{Page, PageCursor};
use orgreport_core::domain::repository::RepositoryRecord;
use orgreport_core::kind::ReportKind;

/// Source of repository pages
#[async_trait]
pub trait RepositoryPageSource: Send + Sync {
    /// Fetches the page following `cursor`
    ///
    /// `None` requests the first page. The cursor is consumed by the call.
    async fn fetch_page(&self, cursor: Option<PageCursor>) -> Result<Page<RepositoryRecord>>;
}

/// GitHub GraphQL implementation of RepositoryPageSource
pub struct GitHubPageSource {
    client: Arc<GitHubClient>,
    kind: ReportKind,
    org: String,
    page_size: u32,
}

impl GitHubPageSource {
    /// Creates a page source for one organization
    ///
    /// # Arguments
    /// * `client` - GitHub client (rate limiting lives in its transport)
    /// * `kind` - report kind, decides the query and embedded fields
    /// * `org` - organization login
    /// * `page_size` - repositories per page
    pub fn new(client: Arc<GitHubClient>, kind: ReportKind, org: String, page_size: u32) -> Self {
        Self {
            client,
            kind,
            org,
            page_size,
        }
    }
}

#[async_trait]
impl RepositoryPageSource for GitHubPageSource {
    async fn fetch_page(&self, cursor: Option<PageCursor>) -> Result<Page<RepositoryRecord>> {
        self.client
            .organization_repositories(&self.kind, &self.org, cursor, self.page_size)
            .await
    }
}
