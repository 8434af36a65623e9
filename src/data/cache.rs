use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;
use std::sync::Arc;

use super::model::PaperSet;

// ---------------------------------------------------------------------------
// Dataset cache keyed by input identity
// ---------------------------------------------------------------------------

/// Identity of one raw input, derived from its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        hasher.write(bytes);
        Fingerprint(hasher.finish())
    }
}

/// Single-slot cache from input fingerprint to the normalized dataset.
///
/// The cached set is valid for the lifetime of one input: storing a new
/// fingerprint evicts the previous entry.  Consumers share the dataset
/// read-only through `Arc`.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<(Fingerprint, Arc<PaperSet>)>,
}

impl DatasetCache {
    pub fn get(&self, fingerprint: Fingerprint) -> Option<Arc<PaperSet>> {
        self.entry
            .as_ref()
            .filter(|(fp, _)| *fp == fingerprint)
            .map(|(_, set)| Arc::clone(set))
    }

    pub fn put(&mut self, fingerprint: Fingerprint, set: Arc<PaperSet>) {
        self.entry = Some((fingerprint, set));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_set() -> Arc<PaperSet> {
        Arc::new(PaperSet::from_papers(Vec::new(), Vec::new()))
    }

    #[test]
    fn same_bytes_same_fingerprint() {
        assert_eq!(Fingerprint::of_bytes(b"abc"), Fingerprint::of_bytes(b"abc"));
        assert_ne!(Fingerprint::of_bytes(b"abc"), Fingerprint::of_bytes(b"abd"));
    }

    #[test]
    fn hit_returns_the_shared_dataset() {
        let mut cache = DatasetCache::default();
        let fp = Fingerprint::of_bytes(b"input");
        let set = empty_set();
        cache.put(fp, Arc::clone(&set));

        let hit = cache.get(fp).unwrap();
        assert!(Arc::ptr_eq(&hit, &set));
    }

    #[test]
    fn new_input_invalidates_the_previous_entry() {
        let mut cache = DatasetCache::default();
        let first = Fingerprint::of_bytes(b"first");
        let second = Fingerprint::of_bytes(b"second");

        cache.put(first, empty_set());
        cache.put(second, empty_set());

        assert!(cache.get(first).is_none());
        assert!(cache.get(second).is_some());
    }
}
