use dashmap::DashMap;

use crate::run::{Run, RunId, RunPatch};

/// Process-local store for in-flight runs.
///
/// The tracker is a best-effort ephemeral cache: operations never fail, and a
/// missing entry is an ordinary lookup miss, not an error. Consumers must
/// treat absence as "run not found" and re-route the user to a fresh input
/// flow. Distinct ids are fully independent; re-entrant access to the same id
/// is a caller obligation to prevent.
pub trait RunStore: Send + Sync {
    /// Stores or overwrites the full record for `id`.
    fn set(&self, id: &RunId, run: Run);

    /// Returns the current record, or `None` if the id is unknown. Pure
    /// lookup, no side effects.
    fn get(&self, id: &RunId) -> Option<Run>;

    /// Merges `patch` onto the existing record.
    ///
    /// An unknown id synthesizes a record from the patch fields instead of
    /// failing, so error reporting against a not-yet-initialized run still
    /// lands somewhere observable.
    fn update(&self, id: &RunId, patch: RunPatch);
}

/// In-memory [`RunStore`] backed by a process-wide concurrent map.
///
/// Entries accumulate for the life of the process and are reclaimed only by
/// restart; the trait seam is the place to swap in a bounded or TTL-evicting
/// store.
#[derive(Default)]
pub struct InMemoryRunStore {
    runs: DashMap<RunId, Run>,
}

impl InMemoryRunStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live run records.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// True when no runs have been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

impl RunStore for InMemoryRunStore {
    fn set(&self, id: &RunId, run: Run) {
        self.runs.insert(id.clone(), run);
    }

    fn get(&self, id: &RunId) -> Option<Run> {
        self.runs.get(id).map(|entry| entry.clone())
    }

    fn update(&self, id: &RunId, patch: RunPatch) {
        let mut entry = self.runs.entry(id.clone()).or_insert_with(Run::default);
        patch.apply(entry.value_mut());
    }
}
