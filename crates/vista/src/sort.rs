//! Sort registry.
//!
//! A view holds at most one comparator. Installing a comparator replaces
//! the previous one; removing it restores storage order.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::view::DataView;

/// Type alias for a compare function for sorting.
///
/// Compares two elements and returns their relative order. Elements that
/// compare `Equal` keep their relative order from the candidate set.
pub type CompareFn<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Builds a comparator that orders elements by an extracted key.
pub fn compare_by_key<T, K, F>(key: F) -> CompareFn<T>
where
    T: 'static,
    K: Ord + 'static,
    F: Fn(&T) -> K + Send + Sync + 'static,
{
    Arc::new(move |a: &T, b: &T| key(a).cmp(&key(b)))
}

/// The sort registry surface of a view.
///
/// Obtained from [`DataView::sort`]. Every mutation recomputes the view
/// and notifies its subscribers.
pub struct Sort<'a, T> {
    view: &'a DataView<T>,
}

impl<'a, T: Clone + Send + Sync + 'static> Sort<'a, T> {
    pub(crate) fn new(view: &'a DataView<T>) -> Self {
        Self { view }
    }

    /// Installs a comparator, replacing any previous one.
    pub fn set<F>(&self, compare: F)
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.set_fn(Some(Arc::new(compare)));
    }

    /// Installs or removes a comparator. `None` deactivates sorting.
    pub fn set_fn(&self, compare: Option<CompareFn<T>>) {
        let active = compare.is_some();
        self.view.shared.state.write().compare = compare;
        tracing::debug!(target: "vista::registry", view = %self.view.label(), active, "comparator set");
        self.view.recompute(false);
    }

    /// Sorts by an extracted key.
    pub fn set_by_key<K, F>(&self, key: F)
    where
        K: Ord + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.set_fn(Some(compare_by_key(key)));
    }

    /// Removes the comparator.
    pub fn clear(&self) {
        self.set_fn(None);
    }

    /// Whether a comparator is installed.
    pub fn is_active(&self) -> bool {
        self.view.shared.state.read().compare.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_by_key() {
        let compare = compare_by_key(|s: &&str| s.len());
        assert_eq!(compare(&"ab", &"abc"), Ordering::Less);
        assert_eq!(compare(&"abc", &"xyz"), Ordering::Equal);
        assert_eq!(compare(&"abcd", &"a"), Ordering::Greater);
    }
}
