//! Repository contents endpoint

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use orgreport_core::domain::target::{Committer, PublishTarget};
use orgreport_core::dto::contents::{FileMetadata, PutFileRequest, PutFileResponse};
use reqwest::Url;

use crate::GitHubClient;
use crate::error::{ClientError, Result};
use crate::transport::ApiRequest;

impl GitHubClient {
    /// Create or update a file
    ///
    /// Without `sha` this is a create and fails with [`ClientError::Conflict`]
    /// if the path already exists. With `sha` it is an update that fails the
    /// same way when the file has moved on since that blob.
    ///
    /// # Arguments
    /// * `target` - repository, path and optional branch
    /// * `message` - commit message
    /// * `content` - raw file bytes, base64 encoded here
    /// * `committer` - commit identity
    /// * `sha` - blob SHA of the file being replaced
    pub async fn create_or_update_file(
        &self,
        target: &PublishTarget,
        message: &str,
        content: &[u8],
        committer: &Committer,
        sha: Option<String>,
    ) -> Result<PutFileResponse> {
        let body = PutFileRequest {
            message: message.to_string(),
            content: STANDARD.encode(content),
            committer: committer.clone(),
            branch: target.branch.clone(),
            sha,
        };
        let body = serde_json::to_value(&body)
            .map_err(|e| ClientError::ParseError(format!("Failed to encode file request: {}", e)))?;

        let response = self
            .transport
            .execute(&ApiRequest::put(self.contents_url(target), body))
            .await
            .map_err(|e| match e {
                ClientError::Conflict { message } => ClientError::Conflict {
                    message: format!("{}: {}", target.path, message),
                },
                other => other,
            })?;

        self.decode(&response)
    }

    /// Blob SHA of an existing file, `None` if the path does not exist
    pub async fn file_sha(&self, target: &PublishTarget) -> Result<Option<String>> {
        let mut url = Url::parse(&self.contents_url(target))
            .map_err(|e| ClientError::ParseError(format!("Invalid contents URL: {}", e)))?;
        if let Some(branch) = &target.branch {
            url.query_pairs_mut().append_pair("ref", branch);
        }

        match self.transport.execute(&ApiRequest::get(url.as_str())).await {
            Ok(response) => {
                let metadata: FileMetadata = self.decode(&response)?;
                Ok(Some(metadata.sha))
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn contents_url(&self, target: &PublishTarget) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url,
            target.owner,
            target.repo,
            target.path.trim_start_matches('/')
        )
    }
}
