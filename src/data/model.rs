use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// CellValue – a single cell in a passthrough column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value for columns the schema does not predeclare.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Paper – one normalized row
// ---------------------------------------------------------------------------

/// A single research paper (one row of the source table).
///
/// Rows whose publication date cannot be parsed never become a `Paper`, so
/// `publish_time` and `year` are always valid.
#[derive(Debug, Clone)]
pub struct Paper {
    /// Paper title; may be empty when the source column is blank.
    pub title: String,
    /// Journal name; `"Unknown"` when the source has none.
    pub journal: String,
    /// Parsed publication date.
    pub publish_time: NaiveDate,
    /// Publication year derived from `publish_time`.
    pub year: i32,
    /// Passthrough columns (e.g. `source_x`): column_name → value.
    pub extra: BTreeMap<String, CellValue>,
}

/// Journal name substituted when the source data carries none.
pub const UNKNOWN_JOURNAL: &str = "Unknown";

// ---------------------------------------------------------------------------
// PaperSet – the complete normalized dataset
// ---------------------------------------------------------------------------

/// The full normalized dataset with pre-computed column indices.
///
/// Immutable once built; filtering and aggregation work on index slices.
#[derive(Debug, Clone)]
pub struct PaperSet {
    /// All papers (rows), in source order.
    pub papers: Vec<Paper>,
    /// Ordered list of passthrough column names (excludes title, journal,
    /// publish_time, year).
    pub extra_columns: Vec<String>,
    /// Sorted unique journal names across the whole set.
    pub journals: Vec<String>,
}

impl PaperSet {
    /// Build the journal index from the normalized rows.
    pub fn from_papers(papers: Vec<Paper>, extra_columns: Vec<String>) -> Self {
        let journals: BTreeSet<String> = papers.iter().map(|p| p.journal.clone()).collect();
        PaperSet {
            papers,
            extra_columns,
            journals: journals.into_iter().collect(),
        }
    }

    /// Number of papers.
    pub fn len(&self) -> usize {
        self.papers.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    /// Min and max publication year present in the data.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let min = self.papers.iter().map(|p| p.year).min()?;
        let max = self.papers.iter().map(|p| p.year).max()?;
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(year: i32, journal: &str) -> Paper {
        Paper {
            title: String::new(),
            journal: journal.to_string(),
            publish_time: NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
            year,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn journal_index_is_sorted_and_unique() {
        let set = PaperSet::from_papers(
            vec![
                paper(2020, "Science"),
                paper(2021, "Nature"),
                paper(2020, "Science"),
            ],
            Vec::new(),
        );
        assert_eq!(set.journals, vec!["Nature", "Science"]);
    }

    #[test]
    fn year_range_spans_the_data() {
        let set = PaperSet::from_papers(
            vec![paper(2019, "A"), paper(2022, "B"), paper(2020, "A")],
            Vec::new(),
        );
        assert_eq!(set.year_range(), Some((2019, 2022)));
        assert_eq!(
            PaperSet::from_papers(Vec::new(), Vec::new()).year_range(),
            None
        );
    }
}
