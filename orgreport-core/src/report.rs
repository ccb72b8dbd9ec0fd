//! Report builder
//!
//! Turns accumulated rows into a sorted table with a header row. Sorting is
//! stable, so rows with equal keys keep the order the server returned them
//! in and re-running over the same data yields the same file.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::csv;
use crate::error::ReportError;

/// One column of a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportColumn {
    /// Field identifier (`repoName`)
    pub key: String,
    /// Human readable header label (`Repository`)
    pub label: String,
}

impl ReportColumn {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// A row keyed by column identifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportRow {
    values: BTreeMap<String, String>,
}

impl ReportRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// A fully built report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    columns: Vec<ReportColumn>,
    header: ReportRow,
    rows: Vec<ReportRow>,
}

impl Report {
    pub fn columns(&self) -> &[ReportColumn] {
        &self.columns
    }

    pub fn header(&self) -> &ReportRow {
        &self.header
    }

    /// Data rows in report order (header excluded)
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Serializes the header followed by every data row
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for row in std::iter::once(&self.header).chain(&self.rows) {
            let cells: Vec<&str> = self
                .columns
                .iter()
                .map(|c| row.get(&c.key).unwrap_or_default())
                .collect();
            csv::write_record(&mut out, &cells);
        }
        out
    }
}

/// Builds a [`Report`] from rows
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    columns: Vec<ReportColumn>,
    sort_key: Option<String>,
    order: SortOrder,
}

impl ReportBuilder {
    pub fn new(columns: Vec<ReportColumn>) -> Self {
        Self {
            columns,
            sort_key: None,
            order: SortOrder::Ascending,
        }
    }

    /// Sorts by the given column, matched by key or label
    pub fn sort_by(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.sort_key = Some(column.into());
        self.order = order;
        self
    }

    /// Validates, sorts and wraps the rows
    ///
    /// Every row must carry every column. Without an explicit sort column the
    /// rows are sorted by the first column.
    pub fn build(self, mut rows: Vec<ReportRow>) -> Result<Report, ReportError> {
        for row in &rows {
            if let Some(missing) = self.columns.iter().find(|c| row.get(&c.key).is_none()) {
                return Err(ReportError::MissingColumn(missing.key.clone()));
            }
        }

        if let Some(key) = self.resolve_sort_key()? {
            let order = self.order;
            let numeric = rows
                .iter()
                .all(|row| parse_finite(row.get(&key).unwrap_or_default()).is_some());
            rows.sort_by(|a, b| {
                let ordering = compare_cells(
                    a.get(&key).unwrap_or_default(),
                    b.get(&key).unwrap_or_default(),
                    numeric,
                );
                match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }

        let header = self
            .columns
            .iter()
            .fold(ReportRow::new(), |row, c| row.with(c.key.clone(), c.label.clone()));

        Ok(Report {
            columns: self.columns,
            header,
            rows,
        })
    }

    fn resolve_sort_key(&self) -> Result<Option<String>, ReportError> {
        let Some(wanted) = &self.sort_key else {
            return Ok(self.columns.first().map(|c| c.key.clone()));
        };

        self.columns
            .iter()
            .find(|c| c.key.eq_ignore_ascii_case(wanted) || c.label.eq_ignore_ascii_case(wanted))
            .map(|c| Some(c.key.clone()))
            .ok_or_else(|| ReportError::UnknownSortColumn {
                column: wanted.clone(),
                available: self
                    .columns
                    .iter()
                    .map(|c| c.key.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Compares two cells of one column
///
/// `numeric` is decided once for the whole column, so the ordering stays
/// total when numbers and names are mixed.
fn compare_cells(a: &str, b: &str, numeric: bool) -> Ordering {
    if numeric {
        if let (Some(x), Some(y)) = (parse_finite(a), parse_finite(b)) {
            return x.total_cmp(&y);
        }
    }
    a.cmp(b)
}

/// Finite number in the cell; `nan` and `inf` count as text
fn parse_finite(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<ReportColumn> {
        vec![
            ReportColumn::new("repoName", "Repository"),
            ReportColumn::new("stars", "Stars"),
        ]
    }

    fn row(name: &str, stars: &str) -> ReportRow {
        ReportRow::new().with("repoName", name).with("stars", stars)
    }

    fn names(report: &Report) -> Vec<&str> {
        report
            .rows()
            .iter()
            .map(|r| r.get("repoName").unwrap())
            .collect()
    }

    #[test]
    fn test_default_sort_is_first_column_ascending() {
        let report = ReportBuilder::new(columns())
            .build(vec![row("c", "1"), row("a", "2"), row("b", "3")])
            .unwrap();
        assert_eq!(names(&report), ["a", "b", "c"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let report = ReportBuilder::new(columns())
            .sort_by("stars", SortOrder::Ascending)
            .build(vec![row("first", "5"), row("x", "1"), row("second", "5")])
            .unwrap();
        assert_eq!(names(&report), ["x", "first", "second"]);
    }

    #[test]
    fn test_descending_keeps_ties_in_server_order() {
        let report = ReportBuilder::new(columns())
            .sort_by("stars", SortOrder::Descending)
            .build(vec![row("first", "5"), row("x", "1"), row("second", "5")])
            .unwrap();
        assert_eq!(names(&report), ["first", "second", "x"]);
    }

    #[test]
    fn test_numeric_columns_sort_by_magnitude() {
        let report = ReportBuilder::new(columns())
            .sort_by("stars", SortOrder::Descending)
            .build(vec![row("a", "9"), row("b", "10"), row("c", "100")])
            .unwrap();
        assert_eq!(names(&report), ["c", "b", "a"]);
    }

    #[test]
    fn test_mixed_column_sorts_as_text_in_any_input_order() {
        let permutations = [
            ["10", "9", "2a"],
            ["10", "2a", "9"],
            ["9", "10", "2a"],
            ["9", "2a", "10"],
            ["2a", "10", "9"],
            ["2a", "9", "10"],
        ];
        for input in permutations {
            let report = ReportBuilder::new(columns())
                .build(input.iter().map(|n| row(n, "1")).collect())
                .unwrap();
            assert_eq!(names(&report), ["10", "2a", "9"], "input {input:?}");
        }
    }

    #[test]
    fn test_nan_named_repository_sorts_as_text() {
        let report = ReportBuilder::new(columns())
            .build(vec![row("nan", "1"), row("b", "1"), row("1", "1"), row("a", "1")])
            .unwrap();
        assert_eq!(names(&report), ["1", "a", "b", "nan"]);
    }

    #[test]
    fn test_column_of_numbers_and_infinity_sorts_as_text() {
        let report = ReportBuilder::new(columns())
            .sort_by("stars", SortOrder::Ascending)
            .build(vec![row("a", "9"), row("b", "inf"), row("c", "10")])
            .unwrap();
        assert_eq!(names(&report), ["c", "a", "b"]);
    }

    #[test]
    fn test_sort_column_matches_label() {
        let report = ReportBuilder::new(columns())
            .sort_by("repository", SortOrder::Descending)
            .build(vec![row("a", "1"), row("b", "1")])
            .unwrap();
        assert_eq!(names(&report), ["b", "a"]);
    }

    #[test]
    fn test_unknown_sort_column() {
        let err = ReportBuilder::new(columns())
            .sort_by("owner", SortOrder::Ascending)
            .build(vec![])
            .unwrap_err();
        assert!(matches!(err, ReportError::UnknownSortColumn { column, .. } if column == "owner"));
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let err = ReportBuilder::new(columns())
            .build(vec![ReportRow::new().with("repoName", "a")])
            .unwrap_err();
        assert_eq!(err, ReportError::MissingColumn("stars".to_string()));
    }

    #[test]
    fn test_header_comes_first() {
        let report = ReportBuilder::new(columns())
            .build(vec![row("a", "1")])
            .unwrap();
        assert_eq!(report.to_csv(), "Repository,Stars\na,1\n");
        assert_eq!(report.header().get("repoName"), Some("Repository"));
    }

    #[test]
    fn test_header_stays_first_even_if_it_would_sort_later() {
        let report = ReportBuilder::new(columns())
            .build(vec![row("Zeta", "1"), row("Alpha", "2")])
            .unwrap();
        let csv = report.to_csv();
        assert!(csv.starts_with("Repository,Stars\n"));
        assert_eq!(report.rows().len(), 2);
    }

    #[test]
    fn test_csv_round_trip_with_special_characters() {
        let tricky = [
            "plain",
            "comma, inside",
            "quote \"inside\"",
            "line\nbreak",
            "all, of \"them\"\r\nhere",
        ];
        let rows: Vec<ReportRow> = tricky
            .iter()
            .enumerate()
            .map(|(i, v)| row(v, &i.to_string()))
            .collect();

        let report = ReportBuilder::new(columns())
            .sort_by("stars", SortOrder::Ascending)
            .build(rows)
            .unwrap();

        let parsed = csv::parse(&report.to_csv());
        assert_eq!(parsed.len(), tricky.len() + 1);
        assert_eq!(parsed[0], ["Repository", "Stars"]);
        for (i, value) in tricky.iter().enumerate() {
            assert_eq!(parsed[i + 1], [value.to_string(), i.to_string()]);
        }
    }
}
