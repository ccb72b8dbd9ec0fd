//! Contents API DTOs

use serde::{Deserialize, Serialize};

use crate::domain::target::Committer;

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`
///
/// `content` must already be base64 encoded. Leaving `sha` unset asks for a
/// create; GitHub rejects it when the path already exists.
#[derive(Debug, Clone, Serialize)]
pub struct PutFileRequest {
    pub message: String,
    pub content: String,
    pub committer: Committer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// Response of a successful create-or-update
#[derive(Debug, Clone, Deserialize)]
pub struct PutFileResponse {
    pub content: Option<ContentInfo>,
    pub commit: CommitInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentInfo {
    pub path: String,
    pub sha: String,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    pub html_url: Option<String>,
}

/// Subset of `GET /repos/{owner}/{repo}/contents/{path}` for a file
#[derive(Debug, Clone, Deserialize)]
pub struct FileMetadata {
    pub path: String,
    pub sha: String,
}
