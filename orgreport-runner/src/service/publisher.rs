//! Idempotent publisher
//!
//! Writes a report artifact to its derived path. The first write never
//! supplies a blob SHA, so an existing file is reported as a conflict rather
//! than silently replaced; what happens next is the [`ConflictPolicy`].

use std::sync::Arc;

use clap::ValueEnum;
use orgreport_client::{ClientError, Result};
use orgreport_core::domain::target::{Committer, PublishTarget};
use orgreport_core::dto::contents::PutFileResponse;
use tracing::{info, warn};

use crate::repository::ContentStore;

/// Numbered alternatives tried by [`ConflictPolicy::Rename`]
const MAX_RENAME_ATTEMPTS: u32 = 5;

/// Reaction to a write hitting an existing path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ConflictPolicy {
    /// Surface the conflict
    #[default]
    Fail,
    /// Replace the existing file, guarded by its current SHA
    Overwrite,
    /// Write to `-2`, `-3`, ... suffixed paths instead
    Rename,
}

/// Where the artifact ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub path: String,
    pub commit_sha: String,
    pub html_url: Option<String>,
    /// An existing file was replaced
    pub replaced: bool,
}

impl PublishOutcome {
    fn new(target: &PublishTarget, response: PutFileResponse, replaced: bool) -> Self {
        let (path, html_url) = match response.content {
            Some(content) => (content.path, content.html_url),
            None => (target.path.clone(), None),
        };
        Self {
            path,
            commit_sha: response.commit.sha,
            html_url: html_url.or(response.commit.html_url),
            replaced,
        }
    }
}

pub struct IdempotentPublisher {
    store: Arc<dyn ContentStore>,
    committer: Committer,
    policy: ConflictPolicy,
}

impl IdempotentPublisher {
    pub fn new(store: Arc<dyn ContentStore>, committer: Committer, policy: ConflictPolicy) -> Self {
        Self {
            store,
            committer,
            policy,
        }
    }

    /// Commits `content` at `target`
    ///
    /// # Arguments
    /// * `target` - repository, branch and derived path
    /// * `message` - commit message
    /// * `content` - file body, encoded by the content store
    pub async fn publish(
        &self,
        target: &PublishTarget,
        message: &str,
        content: &str,
    ) -> Result<PublishOutcome> {
        let conflict = match self.put(target, message, content, None).await {
            Ok(response) => return Ok(PublishOutcome::new(target, response, false)),
            Err(e) if e.is_conflict() => e,
            Err(e) => return Err(e),
        };

        warn!("{} already exists", target);
        match self.policy {
            ConflictPolicy::Fail => Err(conflict),
            ConflictPolicy::Overwrite => self.overwrite(target, message, content, conflict).await,
            ConflictPolicy::Rename => self.rename(target, message, content, conflict).await,
        }
    }

    async fn overwrite(
        &self,
        target: &PublishTarget,
        message: &str,
        content: &str,
        conflict: ClientError,
    ) -> Result<PublishOutcome> {
        let Some(sha) = self.store.file_sha(target).await? else {
            return Err(conflict);
        };

        info!("Overwriting {} (blob {})", target, sha);
        let response = self.put(target, message, content, Some(sha)).await?;
        Ok(PublishOutcome::new(target, response, true))
    }

    async fn rename(
        &self,
        target: &PublishTarget,
        message: &str,
        content: &str,
        mut conflict: ClientError,
    ) -> Result<PublishOutcome> {
        for n in 2..MAX_RENAME_ATTEMPTS + 2 {
            let candidate = target.numbered(n);
            info!("Trying {}", candidate);
            match self.put(&candidate, message, content, None).await {
                Ok(response) => return Ok(PublishOutcome::new(&candidate, response, false)),
                Err(e) if e.is_conflict() => conflict = e,
                Err(e) => return Err(e),
            }
        }
        Err(conflict)
    }

    async fn put(
        &self,
        target: &PublishTarget,
        message: &str,
        content: &str,
        sha: Option<String>,
    ) -> Result<PutFileResponse> {
        self.store
            .put_file(target, message, content.as_bytes(), &self.committer, sha)
            .await
    }
}
