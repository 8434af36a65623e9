use super::model::{Paper, PaperSet};

// ---------------------------------------------------------------------------
// Selection: the year range and journal filter driving recomputation
// ---------------------------------------------------------------------------

/// Journal predicate of a [`Selection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalFilter {
    /// No constraint.
    All,
    /// Exact match on the journal name.
    Only(String),
}

impl JournalFilter {
    pub fn matches(&self, journal: &str) -> bool {
        match self {
            JournalFilter::All => true,
            JournalFilter::Only(j) => j == journal,
        }
    }

    /// Label shown in the journal combo box.
    pub fn label(&self) -> &str {
        match self {
            JournalFilter::All => "All",
            JournalFilter::Only(j) => j,
        }
    }
}

/// The user-chosen filters.  Recomputed per interaction, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Inclusive lower year bound.
    pub year_min: i32,
    /// Inclusive upper year bound.
    pub year_max: i32,
    pub journal: JournalFilter,
}

impl Selection {
    /// The widest selection for a dataset: its full year span, all journals.
    pub fn full_range(set: &PaperSet) -> Self {
        let (year_min, year_max) = set.year_range().unwrap_or((0, 0));
        Selection {
            year_min,
            year_max,
            journal: JournalFilter::All,
        }
    }

    pub fn matches(&self, paper: &Paper) -> bool {
        self.year_min <= paper.year
            && paper.year <= self.year_max
            && self.journal.matches(&paper.journal)
    }
}

/// Return indices of papers that pass the selection, in source order.
pub fn filtered_indices(set: &PaperSet, selection: &Selection) -> Vec<usize> {
    set.papers
        .iter()
        .enumerate()
        .filter(|(_, p)| selection.matches(p))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{load_bytes, SourceFormat};

    fn three_paper_set() -> PaperSet {
        load_bytes(
            b"title,journal,publish_time\n\
              First,Nature,2020-01-01\n\
              Second,Nature,2020-06-01\n\
              Third,Science,2021-02-01\n",
            SourceFormat::Csv,
        )
        .unwrap()
    }

    #[test]
    fn all_journals_in_range_keeps_everything() {
        let set = three_paper_set();
        let sel = Selection {
            year_min: 2020,
            year_max: 2021,
            journal: JournalFilter::All,
        };
        assert_eq!(filtered_indices(&set, &sel), vec![0, 1, 2]);
    }

    #[test]
    fn journal_filter_requires_exact_equality() {
        let set = three_paper_set();
        let sel = Selection {
            year_min: 2020,
            year_max: 2021,
            journal: JournalFilter::Only("Science".into()),
        };
        assert_eq!(filtered_indices(&set, &sel), vec![2]);
    }

    #[test]
    fn year_bounds_are_inclusive() {
        let set = three_paper_set();
        let sel = Selection {
            year_min: 2021,
            year_max: 2021,
            journal: JournalFilter::All,
        };
        let indices = filtered_indices(&set, &sel);
        assert_eq!(indices, vec![2]);
        assert!(indices.iter().all(|&i| set.papers[i].year == 2021));
    }

    #[test]
    fn empty_range_yields_no_rows() {
        let set = three_paper_set();
        let sel = Selection {
            year_min: 2025,
            year_max: 2030,
            journal: JournalFilter::All,
        };
        assert!(filtered_indices(&set, &sel).is_empty());
    }

    #[test]
    fn full_range_covers_the_dataset() {
        let set = three_paper_set();
        let sel = Selection::full_range(&set);
        assert_eq!((sel.year_min, sel.year_max), (2020, 2021));
        assert_eq!(filtered_indices(&set, &sel).len(), set.len());
    }
}
