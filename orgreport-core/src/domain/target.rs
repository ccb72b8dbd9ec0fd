//! Publish target domain types

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Directory every report artifact is written under
pub const REPORTS_DIR: &str = "reports";

/// Timestamp shared by every artifact of a run
///
/// Captured once at process start and truncated to whole seconds, so two
/// publishes from the same run always agree on the path prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStamp(DateTime<Utc>);

impl RunStamp {
    /// Captures the current time
    pub fn capture() -> Self {
        Self::at(Utc::now())
    }

    /// Builds a stamp from an explicit instant, dropping sub-second precision
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant.trunc_subsecs(0))
    }

    /// `YYYY-MM-DDTHH:MM:SSZ`
    pub fn file_timestamp(&self) -> String {
        format!("{}Z", self.0.format("%Y-%m-%dT%H:%M:%S"))
    }

    /// `YYYY-MM-DD`, used in commit messages
    pub fn date(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

/// Identity recorded as the committer of the artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committer {
    pub name: String,
    pub email: String,
}

impl Committer {
    pub const DEFAULT_NAME: &'static str = "github-actions";
    pub const DEFAULT_EMAIL: &'static str = "github-actions@github.com";

    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl Default for Committer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NAME, Self::DEFAULT_EMAIL)
    }
}

/// Location an artifact is written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub branch: Option<String>,
}

impl PublishTarget {
    /// Derives the artifact path for an organization report
    ///
    /// `reports/{org}-{timestamp}Z-{suffix}.csv`
    pub fn for_report(
        owner: impl Into<String>,
        repo: impl Into<String>,
        org: &str,
        stamp: &RunStamp,
        suffix: &str,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            path: report_path(org, stamp, suffix),
            branch: None,
        }
    }

    pub fn on_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch;
        self
    }

    /// Returns a copy whose file stem carries a `-{n}` discriminator
    ///
    /// `reports/acme-…-dependabot-report.csv` becomes
    /// `reports/acme-…-dependabot-report-2.csv`.
    pub fn numbered(&self, n: u32) -> Self {
        let path = match self.path.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.contains('/') => {
                format!("{stem}-{n}.{ext}")
            }
            _ => format!("{}-{n}", self.path),
        };
        Self {
            path,
            ..self.clone()
        }
    }
}

impl fmt::Display for PublishTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.owner, self.repo, self.path)?;
        if let Some(branch) = &self.branch {
            write!(f, "@{branch}")?;
        }
        Ok(())
    }
}

fn report_path(org: &str, stamp: &RunStamp, suffix: &str) -> String {
    format!(
        "{REPORTS_DIR}/{org}-{}-{suffix}.csv",
        stamp.file_timestamp()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stamp() -> RunStamp {
        let instant = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
            + chrono::Duration::milliseconds(812);
        RunStamp::at(instant)
    }

    #[test]
    fn test_stamp_truncates_to_seconds() {
        let stamp = stamp();
        assert_eq!(stamp.file_timestamp(), "2024-03-09T14:05:07Z");
        assert_eq!(stamp.date(), "2024-03-09");
    }

    #[test]
    fn test_report_path_layout() {
        let target = PublishTarget::for_report("acme", "reports", "acme", &stamp(), "dependabot-report");
        assert_eq!(
            target.path,
            "reports/acme-2024-03-09T14:05:07Z-dependabot-report.csv"
        );
        assert_eq!(target.branch, None);
    }

    #[test]
    fn test_same_stamp_same_path() {
        let stamp = stamp();
        let a = PublishTarget::for_report("o", "r", "acme", &stamp, "template-report");
        let b = PublishTarget::for_report("o", "r", "acme", &stamp, "template-report");
        assert_eq!(a, b);
    }

    #[test]
    fn test_numbered_keeps_extension() {
        let target = PublishTarget::for_report("o", "r", "acme", &stamp(), "dependabot-report");
        assert_eq!(
            target.numbered(2).path,
            "reports/acme-2024-03-09T14:05:07Z-dependabot-report-2.csv"
        );
    }

    #[test]
    fn test_display_includes_branch() {
        let target = PublishTarget {
            owner: "o".to_string(),
            repo: "r".to_string(),
            path: "reports/x.csv".to_string(),
            branch: Some("reports".to_string()),
        };
        assert_eq!(target.to_string(), "o/r:reports/x.csv@reports");
    }

    #[test]
    fn test_default_committer() {
        let committer = Committer::default();
        assert_eq!(committer.name, "github-actions");
        assert_eq!(committer.email, "github-actions@github.com");
    }
}
