use std::path::Path;
use std::sync::Arc;

use crate::color::ColorMap;
use crate::data::cache::{DatasetCache, Fingerprint};
use crate::data::filter::{filtered_indices, JournalFilter, Selection};
use crate::data::loader::{self, SourceFormat};
use crate::data::model::PaperSet;
use crate::data::stats::Aggregates;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until the user opens a file).
    pub dataset: Option<Arc<PaperSet>>,

    /// Last normalized input, keyed by content fingerprint.
    cache: DatasetCache,

    /// Active year-range / journal selection.
    pub selection: Selection,

    /// Indices of papers passing the current selection (cached).
    pub visible_indices: Vec<usize>,

    /// Derived summaries for the current view.
    pub aggregates: Aggregates,

    /// Journal → colour, rebuilt per dataset.
    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            cache: DatasetCache::default(),
            selection: Selection {
                year_min: 0,
                year_max: 0,
                journal: JournalFilter::All,
            },
            visible_indices: Vec::new(),
            aggregates: Aggregates::default(),
            color_map: ColorMap::default(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Read, fingerprint, and normalize a metadata file.  A repeated open of
    /// the same content skips the parse via the cache.
    pub fn load_from_path(&mut self, path: &Path) {
        let format = match SourceFormat::from_path(path) {
            Ok(format) => format,
            Err(e) => {
                self.fail_load(path, &e.to_string());
                return;
            }
        };
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.fail_load(path, &e.to_string());
                return;
            }
        };

        let fingerprint = Fingerprint::of_bytes(&bytes);
        if let Some(set) = self.cache.get(fingerprint) {
            log::info!("cache hit for {}", path.display());
            self.set_dataset(set);
            return;
        }

        match loader::load_bytes(&bytes, format) {
            Ok(set) => {
                let set = Arc::new(set);
                log::info!(
                    "loaded {} papers from {} ({} journals)",
                    set.len(),
                    path.display(),
                    set.journals.len()
                );
                self.cache.put(fingerprint, Arc::clone(&set));
                self.set_dataset(set);
            }
            Err(e) => self.fail_load(path, &e.to_string()),
        }
    }

    fn fail_load(&mut self, path: &Path, message: &str) {
        log::error!("failed to load {}: {message}", path.display());
        self.status_message = Some(format!("Error: {message}"));
    }

    /// Ingest a newly loaded dataset: reset the selection to the full year
    /// range, rebuild journal colours, recompute the view.
    pub fn set_dataset(&mut self, set: Arc<PaperSet>) {
        self.selection = Selection::full_range(&set);
        self.color_map = ColorMap::new(&set.journals);
        self.dataset = Some(set);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute visible indices and aggregates after a selection change.
    pub fn refilter(&mut self) {
        if let Some(set) = &self.dataset {
            self.visible_indices = filtered_indices(set, &self.selection);
            self.aggregates = Aggregates::compute(set, &self.visible_indices, &self.selection);
        }
    }

    /// Apply a new year range, swapping the bounds if they cross.
    pub fn set_year_range(&mut self, year_min: i32, year_max: i32) {
        self.selection.year_min = year_min.min(year_max);
        self.selection.year_max = year_min.max(year_max);
        self.refilter();
    }

    pub fn set_journal(&mut self, journal: JournalFilter) {
        self.selection.journal = journal;
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(
            file,
            "title,journal,publish_time\n\
             First,Nature,2020-01-01\n\
             Second,Nature,2020-06-01\n\
             Third,Science,2021-02-01\n"
        )
        .unwrap();
        file
    }

    #[test]
    fn loading_resets_selection_and_view() {
        let file = sample_file();
        let mut state = AppState::default();
        state.load_from_path(file.path());

        assert!(state.status_message.is_none());
        assert_eq!((state.selection.year_min, state.selection.year_max), (2020, 2021));
        assert_eq!(state.selection.journal, JournalFilter::All);
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
        assert_eq!(state.aggregates.total, 3);
    }

    #[test]
    fn reopening_the_same_content_hits_the_cache() {
        let file = sample_file();
        let mut state = AppState::default();

        state.load_from_path(file.path());
        let first = state.dataset.clone().unwrap();
        state.load_from_path(file.path());
        let second = state.dataset.clone().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn selection_changes_recompute_the_view() {
        let file = sample_file();
        let mut state = AppState::default();
        state.load_from_path(file.path());

        state.set_journal(JournalFilter::Only("Science".into()));
        assert_eq!(state.visible_indices, vec![2]);
        assert_eq!(state.aggregates.total, 1);
        assert_eq!(
            state.aggregates.year_histogram,
            vec![(2020, 0), (2021, 1)]
        );

        state.set_year_range(2021, 2020); // crossed bounds are swapped
        assert_eq!((state.selection.year_min, state.selection.year_max), (2020, 2021));
    }

    #[test]
    fn load_failures_leave_a_status_message() {
        let mut state = AppState::default();
        state.load_from_path(Path::new("does-not-exist.csv"));
        assert!(state.dataset.is_none());
        assert!(state.status_message.as_deref().unwrap_or("").starts_with("Error:"));
    }
}
