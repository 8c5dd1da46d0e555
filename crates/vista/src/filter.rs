//! Filter registry.
//!
//! Filters form a conjunction: an element is visible iff every registered
//! predicate accepts it. Evaluation short-circuits on the first rejection
//! and runs in ascending priority, then registration order, so repeated
//! rebuilds call predicates in the same order.

use std::sync::Arc;

use slotmap::{new_key_type, SlotMap};

use crate::view::DataView;

/// Type alias for a filter predicate.
///
/// Returns `true` if the element should be visible.
pub type FilterFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

new_key_type! {
    /// Identifies one registered filter entry.
    ///
    /// Returned by [`Filters::add`]; pass it to [`Filters::remove`].
    pub struct FilterId;
}

/// A predicate with an optional evaluation priority.
///
/// Entries with a priority run before entries without one; lower
/// priorities run first.
pub struct FilterEntry<T> {
    predicate: FilterFn<T>,
    priority: Option<i32>,
}

impl<T> Clone for FilterEntry<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
            priority: self.priority,
        }
    }
}

impl<T> FilterEntry<T> {
    /// Creates an entry with no explicit priority.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::from_fn(Arc::new(predicate))
    }

    /// Creates an entry from an already shared predicate.
    ///
    /// Keep a clone of the `Arc` to remove the entry later with
    /// [`Filters::remove_predicate`].
    pub fn from_fn(predicate: FilterFn<T>) -> Self {
        Self {
            predicate,
            priority: None,
        }
    }

    /// Sets the evaluation priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// The evaluation priority, if one was set.
    pub fn priority(&self) -> Option<i32> {
        self.priority
    }

    /// The predicate.
    pub fn predicate(&self) -> &FilterFn<T> {
        &self.predicate
    }
}

struct Registered<T> {
    entry: FilterEntry<T>,
    seq: u64,
}

/// The filter entries owned by one view.
pub(crate) struct FilterSet<T> {
    entries: SlotMap<FilterId, Registered<T>>,
    next_seq: u64,
}

impl<T> FilterSet<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            next_seq: 0,
        }
    }

    pub(crate) fn insert(&mut self, entry: FilterEntry<T>) -> FilterId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(Registered { entry, seq })
    }

    pub(crate) fn remove(&mut self, id: FilterId) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Removes the earliest registered entry whose predicate is `predicate`.
    pub(crate) fn remove_predicate(&mut self, predicate: &FilterFn<T>) -> bool {
        let target = Arc::as_ptr(predicate) as *const ();
        let found = self
            .entries
            .iter()
            .filter(|(_, registered)| Arc::as_ptr(&registered.entry.predicate) as *const () == target)
            .min_by_key(|(_, registered)| registered.seq)
            .map(|(id, _)| id);

        match found {
            Some(id) => self.entries.remove(id).is_some(),
            None => false,
        }
    }

    pub(crate) fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    pub(crate) fn contains(&self, id: FilterId) -> bool {
        self.entries.contains_key(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Predicates in evaluation order.
    pub(crate) fn ordered(&self) -> Vec<FilterFn<T>> {
        let mut registered: Vec<&Registered<T>> = self.entries.values().collect();
        registered.sort_by_key(|r| (r.entry.priority.is_none(), r.entry.priority, r.seq));
        registered
            .into_iter()
            .map(|r| r.entry.predicate.clone())
            .collect()
    }
}

/// Whether every predicate accepts `item`.
pub(crate) fn accepts<T>(filters: &[FilterFn<T>], item: &T) -> bool {
    filters.iter().all(|filter| filter(item))
}

/// The filter registry surface of a view.
///
/// Obtained from [`DataView::filters`]. Every mutation that changes the
/// registry recomputes the view and notifies its subscribers.
pub struct Filters<'a, T> {
    view: &'a DataView<T>,
}

impl<'a, T: Clone + Send + Sync + 'static> Filters<'a, T> {
    pub(crate) fn new(view: &'a DataView<T>) -> Self {
        Self { view }
    }

    /// Adds a predicate with no explicit priority.
    pub fn add<F>(&self, predicate: F) -> FilterId
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.add_entry(FilterEntry::new(predicate))
    }

    /// Adds one entry.
    pub fn add_entry(&self, entry: FilterEntry<T>) -> FilterId {
        let id = self.view.shared.state.write().filters.insert(entry);
        tracing::debug!(target: "vista::registry", view = %self.view.label(), "filter added");
        self.view.recompute(false);
        id
    }

    /// Adds several entries in argument order, recomputing once.
    pub fn add_all<I>(&self, entries: I) -> Vec<FilterId>
    where
        I: IntoIterator<Item = FilterEntry<T>>,
    {
        let ids: Vec<FilterId> = {
            let mut state = self.view.shared.state.write();
            entries
                .into_iter()
                .map(|entry| state.filters.insert(entry))
                .collect()
        };
        tracing::debug!(
            target: "vista::registry",
            view = %self.view.label(),
            count = ids.len(),
            "filters added"
        );
        self.view.recompute(false);
        ids
    }

    /// Removes one entry. Unknown ids are ignored.
    pub fn remove(&self, id: FilterId) -> bool {
        self.remove_all([id]) == 1
    }

    /// Removes several entries, recomputing once if any was present.
    ///
    /// Returns how many entries were removed.
    pub fn remove_all<I>(&self, ids: I) -> usize
    where
        I: IntoIterator<Item = FilterId>,
    {
        let removed = {
            let mut state = self.view.shared.state.write();
            ids.into_iter().filter(|&id| state.filters.remove(id)).count()
        };
        if removed > 0 {
            tracing::debug!(target: "vista::registry", view = %self.view.label(), removed, "filters removed");
            self.view.recompute(false);
        }
        removed
    }

    /// Removes the earliest entry registered with this exact predicate.
    pub fn remove_predicate(&self, predicate: &FilterFn<T>) -> bool {
        let removed = self.view.shared.state.write().filters.remove_predicate(predicate);
        if removed {
            tracing::debug!(target: "vista::registry", view = %self.view.label(), "filter removed");
            self.view.recompute(false);
        }
        removed
    }

    /// Removes every entry.
    pub fn clear(&self) {
        let cleared = self.view.shared.state.write().filters.clear();
        tracing::debug!(target: "vista::registry", view = %self.view.label(), cleared, "filters cleared");
        self.view.recompute(false);
    }

    /// Whether the entry is still registered.
    pub fn contains(&self, id: FilterId) -> bool {
        self.view.shared.state.read().filters.contains(id)
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.view.shared.state.read().filters.len()
    }

    /// Whether no entry is registered.
    pub fn is_empty(&self) -> bool {
        self.view.shared.state.read().filters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str, result: bool) -> FilterEntry<i32> {
        let log = log.clone();
        FilterEntry::new(move |_: &i32| {
            log.lock().push(tag);
            result
        })
    }

    #[test]
    fn test_ordered_by_priority_then_registration() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut set = FilterSet::new();
        set.insert(recorder(&log, "plain-1", true));
        set.insert(recorder(&log, "prio-5", true).with_priority(5));
        set.insert(recorder(&log, "plain-2", true));
        set.insert(recorder(&log, "prio-1", true).with_priority(1));
        set.insert(recorder(&log, "prio-5b", true).with_priority(5));

        assert!(accepts(&set.ordered(), &0));
        assert_eq!(
            *log.lock(),
            vec!["prio-1", "prio-5", "prio-5b", "plain-1", "plain-2"]
        );
    }

    #[test]
    fn test_short_circuit_on_first_rejection() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut set = FilterSet::new();
        set.insert(recorder(&log, "first", true));
        set.insert(recorder(&log, "second", false));
        set.insert(recorder(&log, "third", true));

        assert!(!accepts(&set.ordered(), &0));
        assert_eq!(*log.lock(), vec!["first", "second"]);
    }

    #[test]
    fn test_empty_set_accepts_everything() {
        let set = FilterSet::<i32>::new();
        assert!(accepts(&set.ordered(), &42));
    }

    #[test]
    fn test_remove_by_id() {
        let mut set = FilterSet::new();
        let even = set.insert(FilterEntry::new(|x: &i32| x % 2 == 0));
        set.insert(FilterEntry::new(|x: &i32| *x > 4));

        assert!(set.remove(even));
        assert!(!set.remove(even));
        assert_eq!(set.len(), 1);
        assert!(accepts(&set.ordered(), &5));
    }

    #[test]
    fn test_remove_predicate_removes_earliest_match_only() {
        let shared: FilterFn<i32> = Arc::new(|x: &i32| *x > 0);
        let mut set = FilterSet::new();
        let first = set.insert(FilterEntry::from_fn(shared.clone()));
        let second = set.insert(FilterEntry::from_fn(shared.clone()).with_priority(-1));

        assert!(set.remove_predicate(&shared));
        assert!(!set.contains(first));
        assert!(set.contains(second));

        let unrelated: FilterFn<i32> = Arc::new(|x: &i32| *x > 0);
        assert!(!set.remove_predicate(&unrelated));
    }

    #[test]
    fn test_clear_reports_count() {
        let mut set = FilterSet::new();
        set.insert(FilterEntry::new(|_: &i32| true));
        set.insert(FilterEntry::new(|_: &i32| true));
        assert_eq!(set.clear(), 2);
        assert!(set.is_empty());
    }

    #[test]
    fn test_view_remove_predicate_notifies_only_on_match() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let view = DataView::new((1..=6).collect::<Vec<i32>>());
        let even: FilterFn<i32> = Arc::new(|x: &i32| x % 2 == 0);
        let unregistered: FilterFn<i32> = Arc::new(|x: &i32| x % 2 == 0);
        view.filters().add_entry(FilterEntry::from_fn(even.clone()));
        assert_eq!(view.to_vec(), vec![2, 4, 6]);

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        view.subscribe(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!view.filters().remove_predicate(&unregistered));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(view.to_vec(), vec![2, 4, 6]);

        assert!(view.filters().remove_predicate(&even));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(view.filters().is_empty());
        assert_eq!(view.to_vec(), vec![1, 2, 3, 4, 5, 6]);

        assert!(!view.filters().remove_predicate(&even));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
