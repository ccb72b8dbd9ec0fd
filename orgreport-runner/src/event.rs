//! Workflow event payload
//!
//! The JSON document GitHub writes to `GITHUB_EVENT_PATH`. Only the fields
//! used to fill in absent inputs are read; everything else is ignored.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub organization: Option<Account>,
    #[serde(default)]
    pub repository: Option<EventRepository>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventRepository {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub owner: Option<Account>,
}

impl EventPayload {
    /// Reads the payload at `path`
    ///
    /// A missing file yields `None` (local runs); malformed JSON is an error.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            warn!("Event payload {} not found, ignoring", path.display());
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event payload {}", path.display()))?;
        let payload = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse event payload {}", path.display()))?;
        Ok(Some(payload))
    }

    /// Organization login, falling back to the repository owner
    pub fn organization_login(&self) -> Option<&str> {
        self.organization
            .as_ref()
            .map(|org| org.login.as_str())
            .or_else(|| {
                self.repository
                    .as_ref()
                    .and_then(|repo| repo.owner.as_ref())
                    .map(|owner| owner.login.as_str())
            })
            .filter(|login| !login.is_empty())
    }

    /// `owner/repo` of the repository the workflow runs in
    pub fn repository_full_name(&self) -> Option<String> {
        let repo = self.repository.as_ref()?;
        match (&repo.full_name, &repo.owner) {
            (Some(full_name), _) if !full_name.is_empty() => Some(full_name.clone()),
            (_, Some(owner)) => Some(format!("{}/{}", owner.login, repo.name)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(json: &str) -> EventPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_organization_event() {
        let event = parse(
            r#"{
                "organization": {"login": "acme"},
                "repository": {"name": "reports", "full_name": "acme/reports", "owner": {"login": "acme"}},
                "sender": {"login": "someone"}
            }"#,
        );
        assert_eq!(event.organization_login(), Some("acme"));
        assert_eq!(event.repository_full_name().as_deref(), Some("acme/reports"));
    }

    #[test]
    fn test_owner_fallback() {
        let event = parse(r#"{"repository": {"name": "reports", "owner": {"login": "octo"}}}"#);
        assert_eq!(event.organization_login(), Some("octo"));
        assert_eq!(event.repository_full_name().as_deref(), Some("octo/reports"));
    }

    #[test]
    fn test_empty_payload() {
        let event = parse("{}");
        assert_eq!(event.organization_login(), None);
        assert_eq!(event.repository_full_name(), None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"organization": {{"login": "acme"}}}}"#).unwrap();

        let event = EventPayload::load(file.path()).unwrap().unwrap();
        assert_eq!(event.organization_login(), Some("acme"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("event.json");
        assert!(EventPayload::load(&missing).unwrap().is_none());
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(EventPayload::load(file.path()).is_err());
    }
}
