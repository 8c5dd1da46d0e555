//! Backing store management.
//!
//! A view never copies the data it projects. The elements live in a
//! [`Sequence<T>`], a shared handle to a `Vec<T>`, and a root view together
//! with all of its derived views reads that one sequence through the same
//! [`BackingStore`] slot.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A shared, mutable, randomly indexable sequence of elements.
///
/// Cloning a `Sequence` clones the handle, not the elements. Two handles
/// are the same sequence if [`ptr_eq`](Self::ptr_eq) says so.
///
/// Mutating a sequence through [`write`](Self::write) bypasses every view
/// built on it. Call `recompute(true)` on the view afterwards.
pub struct Sequence<T> {
    items: Arc<RwLock<Vec<T>>>,
}

impl<T> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Sequence").field(&*self.items.read()).finish()
    }
}

impl<T> Sequence<T> {
    /// Wrap a vector in a new shared sequence.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: Arc::new(RwLock::new(items)),
        }
    }

    /// Lock the sequence for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.items.read()
    }

    /// Lock the sequence for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.items.write()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Whether the sequence holds no elements.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Whether both handles refer to the same sequence.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }

    /// Truncate to zero and append `items`, keeping the sequence identity.
    pub(crate) fn refill(&self, items: Vec<T>) {
        let mut current = self.items.write();
        current.clear();
        current.extend(items);
    }
}

impl<T: Clone> Sequence<T> {
    /// Copy the elements out.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.read().clone()
    }
}

impl<T> From<Vec<T>> for Sequence<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

/// Data handed to a view at construction or through `set_data`.
pub enum DataSource<T> {
    /// An existing sequence, used in place.
    Shared(Sequence<T>),
    /// Freshly collected elements, wrapped in a new sequence.
    Owned(Vec<T>),
    /// No data.
    Empty,
}

impl<T> DataSource<T> {
    /// Collect any finite iterable into an owned source.
    pub fn collect<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::Owned(items.into_iter().collect())
    }
}

impl<T> Default for DataSource<T> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<T> From<Vec<T>> for DataSource<T> {
    fn from(items: Vec<T>) -> Self {
        Self::Owned(items)
    }
}

impl<T> From<Sequence<T>> for DataSource<T> {
    fn from(sequence: Sequence<T>) -> Self {
        Self::Shared(sequence)
    }
}

impl<T> From<&Sequence<T>> for DataSource<T> {
    fn from(sequence: &Sequence<T>) -> Self {
        Self::Shared(sequence.clone())
    }
}

impl<T> From<Option<Vec<T>>> for DataSource<T> {
    fn from(items: Option<Vec<T>>) -> Self {
        items.map_or(Self::Empty, Self::Owned)
    }
}

/// The slot holding a view tree's sequence, or nothing.
///
/// Cloning shares the slot: a derived view clones its parent's store so
/// that replacing the data at the root is visible everywhere.
pub(crate) struct BackingStore<T> {
    slot: Arc<RwLock<Option<Sequence<T>>>>,
}

impl<T> Clone for BackingStore<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T: Clone> BackingStore<T> {
    pub(crate) fn new(source: DataSource<T>) -> Self {
        let sequence = match source {
            DataSource::Shared(sequence) => Some(sequence),
            DataSource::Owned(items) => Some(Sequence::new(items)),
            DataSource::Empty => None,
        };
        Self {
            slot: Arc::new(RwLock::new(sequence)),
        }
    }

    /// The current sequence, if any.
    pub(crate) fn current(&self) -> Option<Sequence<T>> {
        self.slot.read().clone()
    }

    /// Number of elements in the current sequence.
    pub(crate) fn len(&self) -> usize {
        self.slot.read().as_ref().map_or(0, Sequence::len)
    }

    /// Replace or refill the data.
    ///
    /// With `replace` set, or when no sequence is installed yet, the slot
    /// takes the new sequence (or becomes empty). Otherwise the installed
    /// sequence is refilled in place so outside handles to it see the new
    /// elements.
    pub(crate) fn set(&self, source: DataSource<T>, replace: bool) {
        let mut slot = self.slot.write();
        if !replace {
            if let Some(current) = slot.as_ref() {
                let items = match source {
                    DataSource::Shared(sequence) if sequence.ptr_eq(current) => return,
                    DataSource::Shared(sequence) => sequence.to_vec(),
                    DataSource::Owned(items) => items,
                    DataSource::Empty => Vec::new(),
                };
                current.refill(items);
                return;
            }
        }

        *slot = match source {
            DataSource::Shared(sequence) => Some(sequence),
            DataSource::Owned(items) => Some(Sequence::new(items)),
            DataSource::Empty => None,
        };
    }
}
