//! The view handle and its recompute cycle.
//!
//! A [`DataView<T>`] projects a backing sequence through its filters and
//! comparator. Root views own the backing store; derived views share it
//! and are scoped to their parent's visible elements.
//!
//! # Recompute cycle
//!
//! Every registry mutation, reversal, data replacement or explicit
//! [`recompute`](DataView::recompute) runs the same synchronous cycle:
//!
//! 1. the view rebuilds its ordering;
//! 2. every derived view below it rebuilds, parents before children;
//! 3. subscribers are notified: the view's own first, then each derived
//!    view's subtree in creation order.
//!
//! No subscriber runs before the whole subtree is consistent, and every
//! cycle notifies, even when nothing visible changed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use vista_core::{PerfSpan, Result, Subscribers, Subscription, ViewError};

use crate::derived::Derived;
use crate::filter::{FilterSet, Filters};
use crate::index::{self, Iter, VirtualIndex};
use crate::options::ViewOptions;
use crate::sort::{CompareFn, Sort};
use crate::store::{BackingStore, DataSource, Sequence};

/// Subscription handle returned by [`DataView::subscribe`].
pub type ViewSubscription<T> = Subscription<DataView<T>>;

/// Mutable per-view state.
pub(crate) struct ViewState<T> {
    pub(crate) filters: FilterSet<T>,
    pub(crate) compare: Option<CompareFn<T>>,
    pub(crate) reversed: bool,
    pub(crate) index: VirtualIndex,
}

pub(crate) struct ViewShared<T> {
    name: Option<String>,
    store: BackingStore<T>,
    /// Non-owning link to the parent; the parent's registry owns this view.
    parent: Option<Weak<ViewShared<T>>>,
    pub(crate) state: RwLock<ViewState<T>>,
    subscribers: Subscribers<DataView<T>>,
    /// Derived views in creation order.
    pub(crate) children: RwLock<Vec<DataView<T>>>,
    detached: AtomicBool,
}

/// An observable, filtered and sorted view over a shared sequence.
///
/// `DataView` is a cheap handle: clones refer to the same view. The
/// backing data is never copied or reordered; the view keeps a list of
/// positions instead.
///
/// # Example
///
/// ```
/// use vista::DataView;
///
/// let view = DataView::new((1..=10).collect::<Vec<i32>>());
/// view.filters().add(|x: &i32| x % 2 == 0);
/// view.filters().add(|x: &i32| *x > 4);
/// assert_eq!(view.to_vec(), vec![6, 8, 10]);
///
/// view.set_reversed(true);
/// assert_eq!(view.to_vec(), vec![10, 8, 6]);
/// ```
pub struct DataView<T> {
    pub(crate) shared: Arc<ViewShared<T>>,
}

impl<T> Clone for DataView<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> std::fmt::Debug for DataView<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataView")
            .field("name", &self.shared.name)
            .field("len", &self.len())
            .field("active", &self.is_active())
            .field("reversed", &self.is_reversed())
            .field("derived", &self.shared.children.read().len())
            .finish()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for DataView<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Clone + Send + Sync + 'static> DataView<T> {
    /// Creates a root view over `source` with no filters or sort.
    pub fn new(source: impl Into<DataSource<T>>) -> Self {
        Self::with_options(source, ViewOptions::default())
    }

    /// Creates a root view with no data.
    pub fn empty() -> Self {
        Self::new(DataSource::Empty)
    }

    /// Creates a root view with pre-seeded filters, comparator and direction.
    pub fn with_options(source: impl Into<DataSource<T>>, options: ViewOptions<T>) -> Self {
        let view = Self::from_parts(None, BackingStore::new(source.into()), None, options);
        tracing::debug!(target: "vista::view", len = view.len(), "view created");
        view
    }

    /// Creates a derived view under `parent`. Registration is the caller's job.
    pub(crate) fn derived_from(parent: &DataView<T>, name: String, options: ViewOptions<T>) -> Self {
        Self::from_parts(
            Some(name),
            parent.shared.store.clone(),
            Some(Arc::downgrade(&parent.shared)),
            options,
        )
    }

    fn from_parts(
        name: Option<String>,
        store: BackingStore<T>,
        parent: Option<Weak<ViewShared<T>>>,
        options: ViewOptions<T>,
    ) -> Self {
        let (entries, compare, reversed) = options.into_parts();
        let mut filters = FilterSet::new();
        for entry in entries {
            filters.insert(entry);
        }

        let view = Self {
            shared: Arc::new(ViewShared {
                name,
                store,
                parent,
                state: RwLock::new(ViewState {
                    filters,
                    compare,
                    reversed,
                    index: VirtualIndex::Inactive,
                }),
                subscribers: Subscribers::new(),
                children: RwLock::new(Vec::new()),
                detached: AtomicBool::new(false),
            }),
        };
        view.rebuild();
        view
    }

    /// Name of a derived view; `None` for a root view.
    pub fn name(&self) -> Option<&str> {
        self.shared.name.as_deref()
    }

    pub(crate) fn label(&self) -> &str {
        self.shared.label()
    }

    /// Whether this view was created through a derived-view registry.
    pub fn is_derived(&self) -> bool {
        self.shared.parent.is_some()
    }

    /// The parent view, if this is a derived view and the parent is alive.
    pub fn parent(&self) -> Option<DataView<T>> {
        self.shared
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|shared| DataView { shared })
    }

    /// Whether this view was deleted from its parent's registry.
    ///
    /// A detached view shows nothing and ignores recompute requests.
    pub fn is_detached(&self) -> bool {
        self.shared.detached.load(Ordering::Acquire)
    }

    /// Whether both handles refer to the same view.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Number of visible elements.
    pub fn len(&self) -> usize {
        let backing_len = self.shared.store.len();
        self.shared.state.read().index.len(backing_len)
    }

    /// Whether no element is visible.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the view holds its own ordering rather than passing the
    /// backing sequence through.
    pub fn is_active(&self) -> bool {
        self.shared.state.read().index.is_active()
    }

    /// Snapshot of the visible backing positions in stored order, if the
    /// ordering is active.
    pub fn positions(&self) -> Option<Arc<[usize]>> {
        match &self.shared.state.read().index {
            VirtualIndex::Inactive => None,
            VirtualIndex::Active(positions) => Some(positions.clone()),
        }
    }

    /// Maps a position in the stored ordering to a backing position.
    ///
    /// The stored ordering is the forward one; the reversed flag only
    /// changes traversal. Identity when the ordering is inactive.
    pub fn lookup(&self, virtual_pos: usize) -> Option<usize> {
        let backing_len = self.shared.store.len();
        self.shared.state.read().index.lookup(virtual_pos, backing_len)
    }

    /// Whether traversal runs backwards.
    pub fn is_reversed(&self) -> bool {
        self.shared.state.read().reversed
    }

    /// Sets the traversal direction.
    ///
    /// Always recomputes and notifies, even if the flag did not change.
    pub fn set_reversed(&self, reversed: bool) {
        self.shared.state.write().reversed = reversed;
        tracing::debug!(target: "vista::view", view = %self.label(), reversed, "direction set");
        self.recompute(true);
    }

    /// The raw backing sequence.
    ///
    /// Mutating it directly bypasses the view; call `recompute(true)`
    /// afterwards.
    pub fn data(&self) -> Option<Sequence<T>> {
        self.shared.store.current()
    }

    /// Replaces or refills the backing data.
    ///
    /// With `replace == false` and data already installed, the existing
    /// sequence is truncated and refilled in place, so outside
    /// [`Sequence`] handles observe the new elements. Otherwise the new
    /// source is installed as is.
    ///
    /// Always recomputes the whole view tree and notifies.
    ///
    /// # Errors
    ///
    /// [`ViewError::InvalidInput`] on a derived view, which shares its
    /// root's data.
    pub fn set_data(&self, source: impl Into<DataSource<T>>, replace: bool) -> Result<()> {
        if self.is_derived() {
            return Err(ViewError::invalid_input(
                "set_data",
                format!("derived view '{}' shares its root's data", self.label()),
            ));
        }

        self.shared.store.set(source.into(), replace);
        tracing::debug!(
            target: "vista::view",
            replace,
            len = self.shared.store.len(),
            "data set"
        );
        self.recompute(true);
        Ok(())
    }

    /// The filter registry.
    pub fn filters(&self) -> Filters<'_, T> {
        Filters::new(self)
    }

    /// The sort registry.
    pub fn sort(&self) -> Sort<'_, T> {
        Sort::new(self)
    }

    /// The derived-view registry.
    pub fn derived(&self) -> Derived<'_, T> {
        Derived::new(self)
    }

    /// Registers a change handler.
    ///
    /// The handler runs once with this view before `subscribe` returns,
    /// then after every recompute, in subscription order.
    pub fn subscribe<F>(&self, handler: F) -> ViewSubscription<T>
    where
        F: Fn(&DataView<T>) + Send + Sync + 'static,
    {
        self.shared.subscribers.subscribe(self, handler)
    }

    /// Number of registered handlers.
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.len()
    }

    /// Iterates the visible elements in traversal order.
    ///
    /// The iterator works on a snapshot of the current ordering and can be
    /// created again at any time.
    pub fn iter(&self) -> Iter<T> {
        let state = self.shared.state.read();
        Iter::new(self.shared.store.current(), state.index.clone(), state.reversed)
    }

    /// Collects the visible elements in traversal order.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// Rebuilds this view and its derived views, then notifies.
    ///
    /// `force` marks recomputes requested because the data may have
    /// changed without the view knowing. Both kinds notify every
    /// subscriber.
    #[tracing::instrument(skip(self), target = "vista::index", level = "trace", fields(view = %self.label()))]
    pub fn recompute(&self, force: bool) {
        if self.is_detached() {
            tracing::trace!(target: "vista::index", "detached view, skipping recompute");
            return;
        }

        {
            let _span = PerfSpan::new("rebuild");
            self.rebuild_tree();
        }
        self.notify_tree();
    }

    fn children(&self) -> Vec<DataView<T>> {
        self.shared.children.read().clone()
    }

    fn rebuild_tree(&self) {
        self.rebuild();
        for child in self.children() {
            child.rebuild_tree();
        }
    }

    fn notify_tree(&self) {
        self.shared.subscribers.notify(self);
        for child in self.children() {
            child.notify_tree();
        }
    }

    /// Rebuilds this view's ordering only.
    fn rebuild(&self) {
        if self.is_detached() {
            return;
        }

        let parent = match &self.shared.parent {
            None => VirtualIndex::Inactive,
            Some(parent) => match parent.upgrade() {
                Some(parent) => parent.state.read().index.clone(),
                None => VirtualIndex::empty(),
            },
        };
        let (filters, compare) = {
            let state = self.shared.state.read();
            (state.filters.ordered(), state.compare.clone())
        };

        let next = match self.shared.store.current() {
            Some(sequence) => {
                let items = sequence.read();
                index::rebuild(items.as_slice(), &parent, &filters, compare.as_ref())
            }
            None => index::rebuild(&[], &parent, &filters, compare.as_ref()),
        };

        tracing::trace!(
            target: "vista::index",
            view = %self.label(),
            active = next.is_active(),
            filters = filters.len(),
            sorted = compare.is_some(),
            "ordering rebuilt"
        );
        self.shared.state.write().index = next;
    }

    /// Releases everything this view owns and marks it detached.
    pub(crate) fn teardown(&self) {
        self.shared.release();
    }
}

impl<T> ViewShared<T> {
    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<root>")
    }

    fn release(&self) {
        self.detached.store(true, Ordering::Release);

        let children = std::mem::take(&mut *self.children.write());
        for child in children {
            child.shared.release();
        }

        self.subscribers.clear();
        let mut state = self.state.write();
        state.filters.clear();
        state.compare = None;
        state.index = VirtualIndex::empty();
        tracing::debug!(target: "vista::derived", view = %self.label(), "view torn down");
    }
}

impl<T> Drop for ViewShared<T> {
    fn drop(&mut self) {
        // Children outlive their parent only as detached handles.
        let children = std::mem::take(self.children.get_mut());
        for child in children {
            child.shared.release();
        }
    }
}

impl<T: Clone + Send + Sync + 'static> IntoIterator for &DataView<T> {
    type Item = T;
    type IntoIter = Iter<T>;

    fn into_iter(self) -> Iter<T> {
        self.iter()
    }
}

static_assertions::assert_impl_all!(DataView<i32>: Send, Sync, Clone);
