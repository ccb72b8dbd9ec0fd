//! Report kinds
//!
//! A report kind ties a predicate to everything that depends on it: the
//! GraphQL document that embeds the predicate's data in each page, which
//! repositories are kept, the columns, and the artifact naming.

use serde_json::json;

use crate::domain::page::PageCursor;
use crate::domain::repository::RepositoryRecord;
use crate::predicate::{FileExistencePredicate, RepositoryPredicate, TemplateLineagePredicate};
use crate::report::{ReportColumn, ReportRow};

/// Column key of the repository name, present in every kind
pub const NAME_COLUMN: &str = "repoName";

const FILE_COLUMN: &str = "hasFile";
const TEMPLATE_COLUMN: &str = "template";

const YES: &str = "Yes";
const NO: &str = "No";

const FILE_PRESENCE_QUERY: &str = r#"
query ($org: String!, $cursor: String, $pageSize: Int!, $expression: String!) {
  organization(login: $org) {
    repositories(first: $pageSize, after: $cursor) {
      nodes {
        name
        object(expression: $expression) {
          ... on Blob {
            text
          }
        }
      }
      pageInfo {
        endCursor
        hasNextPage
      }
    }
  }
}
"#;

const TEMPLATE_LINEAGE_QUERY: &str = r#"
query ($org: String!, $cursor: String, $pageSize: Int!) {
  organization(login: $org) {
    repositories(first: $pageSize, after: $cursor) {
      nodes {
        name
        templateRepository {
          nameWithOwner
        }
      }
      pageInfo {
        endCursor
        hasNextPage
      }
    }
  }
}
"#;

/// What a run reports on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportKind {
    /// Every repository, flagged with whether a file exists
    FilePresence(FileExistencePredicate),
    /// Only repositories created from a template
    TemplateLineage(TemplateLineagePredicate),
}

impl Default for ReportKind {
    fn default() -> Self {
        Self::FilePresence(FileExistencePredicate::default())
    }
}

impl ReportKind {
    /// GraphQL document for one page of the organization's repositories
    pub fn query(&self) -> &'static str {
        match self {
            Self::FilePresence(_) => FILE_PRESENCE_QUERY,
            Self::TemplateLineage(_) => TEMPLATE_LINEAGE_QUERY,
        }
    }

    /// Variables for the page following `cursor` (`None` for the first page)
    pub fn variables(
        &self,
        org: &str,
        cursor: Option<&PageCursor>,
        page_size: u32,
    ) -> serde_json::Value {
        let mut vars = json!({
            "org": org,
            "cursor": cursor.map(PageCursor::as_str),
            "pageSize": page_size,
        });
        if let Self::FilePresence(predicate) = self {
            vars["expression"] = json!(predicate.expression());
        }
        vars
    }

    /// Whether a fetched repository belongs in the report
    pub fn retains(&self, record: &RepositoryRecord) -> bool {
        match self {
            Self::FilePresence(_) => true,
            Self::TemplateLineage(predicate) => predicate.evaluate(record),
        }
    }

    pub fn columns(&self) -> Vec<ReportColumn> {
        match self {
            Self::FilePresence(predicate) => vec![
                ReportColumn::new(NAME_COLUMN, "Repository"),
                ReportColumn::new(FILE_COLUMN, capitalize(predicate.file_name())),
            ],
            Self::TemplateLineage(_) => vec![
                ReportColumn::new(NAME_COLUMN, "Repository"),
                ReportColumn::new(TEMPLATE_COLUMN, "Template Repository"),
            ],
        }
    }

    /// Maps a retained record to its report row
    pub fn row(&self, record: &RepositoryRecord) -> ReportRow {
        let row = ReportRow::new().with(NAME_COLUMN, record.name.clone());
        match self {
            Self::FilePresence(predicate) => {
                let flag = if predicate.evaluate(record) { YES } else { NO };
                row.with(FILE_COLUMN, flag)
            }
            Self::TemplateLineage(_) => row.with(
                TEMPLATE_COLUMN,
                record.template.clone().unwrap_or_else(|| NO.to_string()),
            ),
        }
    }

    /// Artifact name suffix (`dependabot-report`)
    pub fn suffix(&self) -> String {
        match self {
            Self::FilePresence(predicate) => format!("{}-report", file_stem(predicate)),
            Self::TemplateLineage(_) => "template-report".to_string(),
        }
    }

    /// Commit title (`Dependabot Report`)
    pub fn title(&self) -> String {
        match self {
            Self::FilePresence(predicate) => format!("{} Report", capitalize(&file_stem(predicate))),
            Self::TemplateLineage(_) => "Template Report".to_string(),
        }
    }
}

fn file_stem(predicate: &FileExistencePredicate) -> String {
    let name = predicate.file_name().trim_start_matches('.');
    let stem = name.split_once('.').map_or(name, |(stem, _)| stem);
    if stem.is_empty() {
        "file".to_string()
    } else {
        stem.to_ascii_lowercase()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
