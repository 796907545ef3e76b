//! The caller's watch list.

use indexmap::IndexSet;
use watchtree_path::InstancePath;

/// The set of instance paths the caller wants materialized, plus a dirty
/// flag.
///
/// Every call that changes membership sets the flag. A call that leaves
/// membership as it was, such as re-adding a watched path or removing an
/// absent one, is not a mutation and leaves the flag alone, so it never
/// forces a rebuild. The sync engine clears it with [`mark_clean`](Self::mark_clean) after a full
/// pass. `mark_clean` calls are counted so that callers can assert a
/// rebuild happened exactly once.
///
/// Watching is off until [`start_watch`](Self::start_watch). Toggling it
/// does not touch membership or the dirty flag.
///
/// # Examples
///
/// ```
/// use watchtree_obs::ObservationSet;
/// use watchtree_path::InstancePath;
///
/// let mut set = ObservationSet::new();
/// let v = InstancePath::decode("net.pop[0].electrical.v").unwrap();
/// assert!(set.add(v.clone()));
/// assert!(set.is_dirty());
/// assert!(!set.add(v));
///
/// set.mark_clean();
/// assert!(!set.is_dirty());
/// assert_eq!(set.clean_count(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ObservationSet {
    paths: IndexSet<InstancePath>,
    dirty: bool,
    watching: bool,
    clean_count: u64,
}

impl ObservationSet {
    /// An empty, clean, non-watching set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `path` is watched.
    pub fn contains(&self, path: &InstancePath) -> bool {
        self.paths.contains(path)
    }

    /// Watch `path`. Returns `true` if it was not already watched.
    ///
    /// Sets the dirty flag only when `true` is returned.
    pub fn add(&mut self, path: InstancePath) -> bool {
        let added = self.paths.insert(path);
        self.dirty |= added;
        added
    }

    /// Stop watching `path`. Returns `true` if it was watched.
    ///
    /// Sets the dirty flag only when `true` is returned.
    pub fn remove(&mut self, path: &InstancePath) -> bool {
        let removed = self.paths.shift_remove(path);
        self.dirty |= removed;
        removed
    }

    /// Watch every path in `paths`. Returns how many were new.
    pub fn extend<I: IntoIterator<Item = InstancePath>>(&mut self, paths: I) -> usize {
        paths.into_iter().map(|p| self.add(p)).filter(|&added| added).count()
    }

    /// Unwatch everything. Clearing an empty set is not a mutation.
    pub fn clear(&mut self) {
        if !self.paths.is_empty() {
            self.paths.clear();
            self.dirty = true;
        }
    }

    /// Watched paths, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &InstancePath> {
        self.paths.iter()
    }

    /// Number of watched paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether nothing is watched.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Whether membership changed since the last full pass.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag. Called once per full pass.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
        self.clean_count += 1;
    }

    /// How many times [`mark_clean`](Self::mark_clean) has been called.
    pub fn clean_count(&self) -> u64 {
        self.clean_count
    }

    /// Turn watching on.
    pub fn start_watch(&mut self) {
        self.watching = true;
    }

    /// Turn watching off. Membership is kept.
    pub fn stop_watch(&mut self) {
        self.watching = false;
    }

    /// Whether watching is on.
    pub fn is_watching(&self) -> bool {
        self.watching
    }
}
