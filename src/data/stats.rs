use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use super::filter::Selection;
use super::model::PaperSet;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// How many journals the ranking keeps.
pub const TOP_JOURNALS: usize = 10;

/// How many title tokens the frequency table keeps.
pub const TOP_WORDS: usize = 100;

/// Passthrough column carrying the ingest source of each paper.
pub const SOURCE_COLUMN: &str = "source_x";

/// Generic English stopwords plus noise terms of research-paper titles (the
/// dataset's own subject keyword and boilerplate academic vocabulary).
const STOPWORD_LIST: &[&str] = &[
    "the", "and", "of", "in", "a", "to", "for", "on", "with", "by", "from", "an", "as", "is",
    "are", "at", "this", "that", "we", "study", "covid", "using", "use", "data", "paper",
];

static STOPWORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOPWORD_LIST.iter().copied().collect());

/// Word tokens: alphanumeric runs bounded by non-word characters.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid token regex"));

// ---------------------------------------------------------------------------
// Aggregates – everything the dashboard derives from a filtered view
// ---------------------------------------------------------------------------

/// Derived summaries over one filtered view.  Recomputed from scratch on
/// every selection change; never cached across filters.
#[derive(Debug, Clone, Default)]
pub struct Aggregates {
    /// Rows in the filtered view.
    pub total: usize,
    /// Distinct journal names in the filtered view.
    pub unique_journals: usize,
    /// Count per year over the full requested range, zero-filled.
    pub year_histogram: Vec<(i32, usize)>,
    /// Journals by descending paper count, at most [`TOP_JOURNALS`].
    pub top_journals: Vec<(String, usize)>,
    /// Papers per ingest source; empty when the column is absent.
    pub source_distribution: Vec<(String, usize)>,
    /// Title token frequencies, at most [`TOP_WORDS`].
    pub word_counts: Vec<(String, usize)>,
}

impl Aggregates {
    pub fn compute(set: &PaperSet, indices: &[usize], selection: &Selection) -> Self {
        let unique_journals = indices
            .iter()
            .map(|&i| set.papers[i].journal.as_str())
            .collect::<HashSet<_>>()
            .len();

        Aggregates {
            total: indices.len(),
            unique_journals,
            year_histogram: year_histogram(set, indices, selection.year_min, selection.year_max),
            top_journals: top_journals(set, indices, TOP_JOURNALS),
            source_distribution: source_distribution(set, indices),
            word_counts: title_word_counts(set, indices, TOP_WORDS),
        }
    }
}

// ---------------------------------------------------------------------------
// Individual aggregates
// ---------------------------------------------------------------------------

/// Papers per year for every year in `[year_min, year_max]` inclusive.
/// Years without matches appear with an explicit 0.
pub fn year_histogram(
    set: &PaperSet,
    indices: &[usize],
    year_min: i32,
    year_max: i32,
) -> Vec<(i32, usize)> {
    if year_min > year_max {
        return Vec::new();
    }
    let mut counts: HashMap<i32, usize> = HashMap::new();
    for &i in indices {
        *counts.entry(set.papers[i].year).or_insert(0) += 1;
    }
    (year_min..=year_max)
        .map(|year| (year, counts.get(&year).copied().unwrap_or(0)))
        .collect()
}

/// The `n` most frequent journals, descending; ties keep first-seen order.
pub fn top_journals(set: &PaperSet, indices: &[usize], n: usize) -> Vec<(String, usize)> {
    let mut counts = count_first_seen(indices.iter().map(|&i| set.papers[i].journal.clone()));
    counts.truncate(n);
    counts
}

/// Papers per ingest source, descending.  Null cells are skipped; a dataset
/// without the column yields an empty table.
pub fn source_distribution(set: &PaperSet, indices: &[usize]) -> Vec<(String, usize)> {
    count_first_seen(indices.iter().filter_map(|&i| {
        set.papers[i]
            .extra
            .get(SOURCE_COLUMN)
            .filter(|v| !v.is_null())
            .map(|v| v.to_string())
    }))
}

/// Token frequencies over the filtered titles: lowercase word tokens, minus
/// stopwords and tokens of at most two characters, descending, capped at
/// `limit`.  Ties keep first-seen order.
pub fn title_word_counts(set: &PaperSet, indices: &[usize], limit: usize) -> Vec<(String, usize)> {
    let tokens = indices
        .iter()
        .flat_map(|&i| {
            let title = set.papers[i].title.to_lowercase();
            TOKEN_RE
                .find_iter(&title)
                .map(|m| m.as_str().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|t| t.chars().count() > 2 && !STOPWORDS.contains(t.as_str()));

    let mut counts = count_first_seen(tokens);
    counts.truncate(limit);
    counts
}

/// Count occurrences preserving first-appearance order, then sort by count
/// descending.  The sort is stable, so equal counts keep first-seen order.
fn count_first_seen(values: impl Iterator<Item = String>) -> Vec<(String, usize)> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for value in values {
        match index.get(&value) {
            Some(&slot) => order[slot].1 += 1,
            None => {
                index.insert(value.clone(), order.len());
                order.push((value, 1));
            }
        }
    }
    order.sort_by_key(|&(_, count)| Reverse(count));
    order
}
