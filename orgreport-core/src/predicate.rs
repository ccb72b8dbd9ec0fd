//! Repository predicates
//!
//! Pure checks evaluated against a single fetched [`RepositoryRecord`]. The
//! data a predicate needs is requested as part of the page query, so these
//! never touch the network. A missing field is a normal "no" outcome.

use crate::domain::repository::RepositoryRecord;

/// A pure per-repository check
pub trait RepositoryPredicate {
    fn evaluate(&self, record: &RepositoryRecord) -> bool;
}

/// Holds when a file exists at a fixed `ref:path`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileExistencePredicate {
    /// Git ref the path is resolved against (a branch name such as `main`)
    pub reference: String,
    /// Repository-relative path of the file
    pub path: String,
}

impl FileExistencePredicate {
    pub const DEFAULT_REFERENCE: &'static str = "main";
    pub const DEFAULT_PATH: &'static str = ".github/dependabot.yml";

    pub fn new(reference: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            path: path.into(),
        }
    }

    /// Object expression passed to GraphQL `object(expression:)`
    pub fn expression(&self) -> String {
        format!("{}:{}", self.reference, self.path)
    }

    /// File name component of the path (`dependabot.yml`)
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

impl Default for FileExistencePredicate {
    fn default() -> Self {
        Self::new(Self::DEFAULT_REFERENCE, Self::DEFAULT_PATH)
    }
}

impl RepositoryPredicate for FileExistencePredicate {
    fn evaluate(&self, record: &RepositoryRecord) -> bool {
        record.file_text.is_some()
    }
}

/// Holds when a repository was created from a given template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLineagePredicate {
    /// Template repository in `owner/repo` form
    pub template: String,
}

impl TemplateLineagePredicate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl RepositoryPredicate for TemplateLineagePredicate {
    fn evaluate(&self, record: &RepositoryRecord) -> bool {
        // GitHub owner and repository names are case-insensitive.
        record
            .template
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(&self.template))
    }
}
