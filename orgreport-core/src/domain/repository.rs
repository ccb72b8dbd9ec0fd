//! Repository domain types

use serde::{Deserialize, Serialize};

/// Snapshot of one repository as returned in a single page
///
/// The optional fields carry whatever the active predicate needs. They are
/// embedded in the page response so predicates never issue extra requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub name: String,
    /// Text of the blob resolved at the configured `ref:path` expression.
    /// Binary blobs resolve to an empty string.
    pub file_text: Option<String>,
    /// `owner/repo` of the template this repository was created from
    pub template: Option<String>,
}

impl RepositoryRecord {
    /// Creates a record with no predicate fields set
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_text: None,
            template: None,
        }
    }

    pub fn with_file_text(mut self, text: impl Into<String>) -> Self {
        self.file_text = Some(text.into());
        self
    }

    pub fn with_template(mut self, name_with_owner: impl Into<String>) -> Self {
        self.template = Some(name_with_owner.into());
        self
    }
}
