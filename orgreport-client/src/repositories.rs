//! Organization repository listing

use orgreport_core::domain::page::{Page, PageCursor};
use orgreport_core::domain::repository::RepositoryRecord;
use orgreport_core::dto::graphql::OrganizationData;
use orgreport_core::kind::ReportKind;

use crate::GitHubClient;
use crate::error::{ClientError, Result};

impl GitHubClient {
    /// Fetch one page of an organization's repositories
    ///
    /// The cursor is consumed: pass `None` for the first page and the
    /// previous page's `next` afterwards.
    ///
    /// # Arguments
    /// * `kind` - decides which predicate fields are embedded in each node
    /// * `org` - organization login
    /// * `cursor` - position to resume after
    /// * `page_size` - nodes per page (GitHub caps this at 100)
    pub async fn organization_repositories(
        &self,
        kind: &ReportKind,
        org: &str,
        cursor: Option<PageCursor>,
        page_size: u32,
    ) -> Result<Page<RepositoryRecord>> {
        let variables = kind.variables(org, cursor.as_ref(), page_size);
        let data: OrganizationData = self.graphql(kind.query(), variables).await?;

        let organization = data
            .organization
            .ok_or_else(|| ClientError::NotFound(format!("organization '{}'", org)))?;

        organization
            .repositories
            .into_page()
            .map_err(|e| ClientError::ParseError(e.to_string()))
    }
}
