//! Content store
//!
//! Writes report artifacts into a repository.

use std::sync::Arc;

use async_trait::async_trait;
use orgreport_client::{GitHubClient, Result};
use orgreport_core::domain::target::{Committer, PublishTarget};
use orgreport_core::dto::contents::PutFileResponse;

/// Repository file storage
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Creates a file, or replaces it when `sha` names the current blob
    ///
    /// Returns `ClientError::Conflict` when the path exists and `sha` is
    /// unset or stale.
    async fn put_file(
        &self,
        target: &PublishTarget,
        message: &str,
        content: &[u8],
        committer: &Committer,
        sha: Option<String>,
    ) -> Result<PutFileResponse>;

    /// Blob SHA currently stored at the target path
    async fn file_sha(&self, target: &PublishTarget) -> Result<Option<String>>;
}

/// GitHub contents API implementation of ContentStore
pub struct GitHubContentStore {
    client: Arc<GitHubClient>,
}

impl GitHubContentStore {
    pub fn new(client: Arc<GitHubClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContentStore for GitHubContentStore {
    async fn put_file(
        &self,
        target: &PublishTarget,
        message: &str,
        content: &[u8],
        committer: &Committer,
        sha: Option<String>,
    ) -> Result<PutFileResponse> {
        self.client
            .create_or_update_file(target, message, content, committer, sha)
            .await
    }

    async fn file_sha(&self, target: &PublishTarget) -> Result<Option<String>> {
        self.client.file_sha(target).await
    }
}
