//! GraphQL DTOs

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::page::Page;
use crate::domain::repository::RepositoryRecord;

/// Body of a GraphQL `POST`
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest {
    pub query: String,
    pub variables: serde_json::Value,
}

/// Envelope of every GraphQL response
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// `data` of the organization repositories query
#[derive(Debug, Deserialize)]
pub struct OrganizationData {
    pub organization: Option<OrganizationNode>,
}

#[derive(Debug, Deserialize)]
pub struct OrganizationNode {
    pub repositories: RepositoryConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryConnection {
    #[serde(default)]
    pub nodes: Vec<Option<RepositoryNode>>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryNode {
    pub name: String,
    /// `object(expression:)` narrowed to `... on Blob`. A tree at the
    /// expression comes back as `{}`, which still counts as present.
    #[serde(default)]
    pub object: Option<BlobNode>,
    #[serde(default)]
    pub template_repository: Option<TemplateNode>,
}

#[derive(Debug, Deserialize)]
pub struct BlobNode {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateNode {
    pub name_with_owner: String,
}

/// The server claimed another page but gave no cursor to reach it
#[derive(Debug, Error, PartialEq, Eq)]
#[error("page reports hasNextPage but no endCursor")]
pub struct MissingEndCursor;

impl From<RepositoryNode> for RepositoryRecord {
    fn from(node: RepositoryNode) -> Self {
        Self {
            name: node.name,
            file_text: node.object.map(|blob| blob.text.unwrap_or_default()),
            template: node.template_repository.map(|t| t.name_with_owner),
        }
    }
}

impl RepositoryConnection {
    /// Converts the connection into a domain page, preserving node order
    pub fn into_page(self) -> Result<Page<RepositoryRecord>, MissingEndCursor> {
        let items = self
            .nodes
            .into_iter()
            .flatten()
            .map(RepositoryRecord::from)
            .collect();

        match (self.page_info.has_next_page, self.page_info.end_cursor) {
            (true, Some(cursor)) => Ok(Page::with_next(items, cursor)),
            (true, None) => Err(MissingEndCursor),
            (false, _) => Ok(Page::last(items)),
        }
    }
}
