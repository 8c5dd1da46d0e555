//! Virtual ordering.
//!
//! A view's visible elements are described by a [`VirtualIndex`]: either
//! `Inactive`, meaning the backing sequence is traversed directly, or
//! `Active` with the backing positions to visit, in order.

use std::iter::FusedIterator;
use std::sync::Arc;

use crate::filter::{accepts, FilterFn};
use crate::sort::CompareFn;
use crate::store::Sequence;

/// The positions a view visits in its backing sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) enum VirtualIndex {
    /// Identity traversal of the backing sequence.
    #[default]
    Inactive,
    /// Backing positions in visible order. Each position appears once.
    Active(Arc<[usize]>),
}

impl VirtualIndex {
    /// An active ordering with nothing visible.
    pub(crate) fn empty() -> Self {
        Self::Active(Arc::from(Vec::new()))
    }

    pub(crate) fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// Visible count, given the backing length.
    pub(crate) fn len(&self, backing_len: usize) -> usize {
        match self {
            Self::Inactive => backing_len,
            Self::Active(positions) => positions.len(),
        }
    }

    /// Backing position of the `virtual_pos`-th entry in stored order.
    pub(crate) fn lookup(&self, virtual_pos: usize, backing_len: usize) -> Option<usize> {
        match self {
            Self::Inactive => (virtual_pos < backing_len).then_some(virtual_pos),
            Self::Active(positions) => positions.get(virtual_pos).copied(),
        }
    }
}

/// Rebuilds an ordering from scratch.
///
/// Candidates are the parent's visible positions, or `0..items.len()` when
/// `parent` is inactive. Retained positions keep candidate order unless a
/// comparator is given, in which case they are stable-sorted by element.
///
/// With no filters and no comparator the result is the parent's ordering
/// itself, so a root view with nothing registered stays inactive.
pub(crate) fn rebuild<T>(
    items: &[T],
    parent: &VirtualIndex,
    filters: &[FilterFn<T>],
    compare: Option<&CompareFn<T>>,
) -> VirtualIndex {
    if filters.is_empty() && compare.is_none() {
        return parent.clone();
    }

    let mut positions: Vec<usize> = match parent {
        VirtualIndex::Inactive => (0..items.len())
            .filter(|&pos| accepts(filters, &items[pos]))
            .collect(),
        VirtualIndex::Active(candidates) => candidates
            .iter()
            .copied()
            .filter(|&pos| items.get(pos).is_some_and(|item| accepts(filters, item)))
            .collect(),
    };

    if let Some(compare) = compare {
        // `sort_by` is stable: equal elements keep candidate order.
        positions.sort_by(|&a, &b| compare(&items[a], &items[b]));
    }

    VirtualIndex::Active(positions.into())
}

/// Iterator over the visible elements of a view.
///
/// Created by [`DataView::iter`](crate::DataView::iter). It walks a snapshot
/// of the ordering taken at creation and clones each element as it is
/// reached. If the backing sequence shrinks underneath it, iteration stops
/// at the first position that no longer exists.
pub struct Iter<T> {
    sequence: Option<Sequence<T>>,
    positions: Option<Arc<[usize]>>,
    front: usize,
    back: usize,
    reversed: bool,
}

impl<T> Iter<T> {
    pub(crate) fn new(sequence: Option<Sequence<T>>, index: VirtualIndex, reversed: bool) -> Self {
        let (positions, back) = match index {
            VirtualIndex::Inactive => (None, sequence.as_ref().map_or(0, Sequence::len)),
            VirtualIndex::Active(positions) => {
                let len = positions.len();
                (Some(positions), len)
            }
        };
        Self {
            sequence,
            positions,
            front: 0,
            back,
            reversed,
        }
    }
}

impl<T: Clone> Iter<T> {
    fn fetch(&mut self, slot: usize) -> Option<T> {
        let pos = match &self.positions {
            Some(positions) => positions[slot],
            None => slot,
        };
        let item = self
            .sequence
            .as_ref()
            .and_then(|sequence| sequence.read().get(pos).cloned());
        if item.is_none() {
            self.front = self.back;
        }
        item
    }

    fn take_front(&mut self) -> Option<T> {
        if self.front >= self.back {
            return None;
        }
        let slot = self.front;
        self.front += 1;
        self.fetch(slot)
    }

    fn take_back(&mut self) -> Option<T> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.fetch(self.back)
    }
}

impl<T: Clone> Iterator for Iter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.reversed {
            self.take_back()
        } else {
            self.take_front()
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.back - self.front))
    }
}

impl<T: Clone> DoubleEndedIterator for Iter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.reversed {
            self.take_front()
        } else {
            self.take_back()
        }
    }
}

impl<T: Clone> FusedIterator for Iter<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::compare_by_key;

    fn filter(f: impl Fn(&i32) -> bool + Send + Sync + 'static) -> FilterFn<i32> {
        Arc::new(f)
    }

    fn positions(index: &VirtualIndex) -> Vec<usize> {
        match index {
            VirtualIndex::Inactive => panic!("expected an active ordering"),
            VirtualIndex::Active(positions) => positions.to_vec(),
        }
    }

    #[test]
    fn test_rebuild_inactive_without_filters_or_sort() {
        let items = vec![3, 1, 2];
        let index = rebuild(&items, &VirtualIndex::Inactive, &[], None);
        assert_eq!(index, VirtualIndex::Inactive);
        assert_eq!(index.len(items.len()), 3);
    }

    #[test]
    fn test_rebuild_filter_conjunction() {
        let items: Vec<i32> = (1..=10).collect();
        let filters = [filter(|x| x % 2 == 0), filter(|x| *x > 4)];
        let index = rebuild(&items, &VirtualIndex::Inactive, &filters, None);

        let visible: Vec<i32> = positions(&index).iter().map(|&p| items[p]).collect();
        assert_eq!(visible, vec![6, 8, 10]);
    }

    #[test]
    fn test_rebuild_sort_only_is_full_permutation() {
        let items = vec![30, 10, 20];
        let compare = compare_by_key(|x: &i32| *x);
        let index = rebuild(&items, &VirtualIndex::Inactive, &[], Some(&compare));
        assert_eq!(positions(&index), vec![1, 2, 0]);
    }

    #[test]
    fn test_rebuild_sort_is_stable() {
        let items = vec![(1, 'a'), (1, 'b'), (0, 'c'), (1, 'd'), (0, 'e')];
        let compare = compare_by_key(|item: &(i32, char)| item.0);
        let index = rebuild(&items, &VirtualIndex::Inactive, &[], Some(&compare));
        assert_eq!(positions(&index), vec![2, 4, 0, 1, 3]);
    }

    #[test]
    fn test_rebuild_scoped_to_parent() {
        let items: Vec<i32> = (1..=10).collect();
        let parent = VirtualIndex::Active(Arc::from(vec![9, 7, 5, 3, 1]));
        let filters = [filter(|x| *x > 4)];
        let index = rebuild(&items, &parent, &filters, None);

        // Parent order is kept; only parent-visible positions are candidates.
        assert_eq!(positions(&index), vec![9, 7, 5]);
    }

    #[test]
    fn test_rebuild_without_own_state_mirrors_parent() {
        let items: Vec<i32> = (1..=5).collect();
        let parent = VirtualIndex::Active(Arc::from(vec![4, 0]));
        let index = rebuild(&items, &parent, &[], None);
        assert_eq!(index, parent);
    }

    #[test]
    fn test_rebuild_skips_stale_parent_positions() {
        let items = vec![1, 2];
        let parent = VirtualIndex::Active(Arc::from(vec![0, 5, 1]));
        let index = rebuild(&items, &parent, &[filter(|_| true)], None);
        assert_eq!(positions(&index), vec![0, 1]);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(VirtualIndex::Inactive.lookup(2, 3), Some(2));
        assert_eq!(VirtualIndex::Inactive.lookup(3, 3), None);

        let index = VirtualIndex::Active(Arc::from(vec![4, 2]));
        assert_eq!(index.lookup(0, 10), Some(4));
        assert_eq!(index.lookup(2, 10), None);
    }

    #[test]
    fn test_iter_inactive_forward_and_reversed() {
        let sequence = Sequence::new(vec![1, 2, 3]);
        let forward: Vec<i32> = Iter::new(Some(sequence.clone()), VirtualIndex::Inactive, false).collect();
        let reversed: Vec<i32> = Iter::new(Some(sequence), VirtualIndex::Inactive, true).collect();
        assert_eq!(forward, vec![1, 2, 3]);
        assert_eq!(reversed, vec![3, 2, 1]);
    }

    #[test]
    fn test_iter_active_reversed_walks_same_ordering() {
        let sequence = Sequence::new(vec!['a', 'b', 'c', 'd']);
        let index = VirtualIndex::Active(Arc::from(vec![3, 0, 2]));
        let reversed: Vec<char> = Iter::new(Some(sequence), index, true).collect();
        assert_eq!(reversed, vec!['c', 'a', 'd']);
    }

    #[test]
    fn test_iter_double_ended() {
        let sequence = Sequence::new(vec![1, 2, 3, 4]);
        let mut iter = Iter::new(Some(sequence), VirtualIndex::Inactive, false);
        assert_eq!(iter.next(), Some(1));
        assert_eq!(iter.next_back(), Some(4));
        assert_eq!(iter.next(), Some(2));
        assert_eq!(iter.next_back(), Some(3));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_iter_without_data() {
        let mut iter = Iter::<i32>::new(None, VirtualIndex::Inactive, false);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_iter_stops_when_backing_shrinks() {
        let sequence = Sequence::new(vec![1, 2, 3]);
        let mut iter = Iter::new(Some(sequence.clone()), VirtualIndex::Inactive, false);
        assert_eq!(iter.next(), Some(1));

        sequence.write().truncate(1);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }
}
