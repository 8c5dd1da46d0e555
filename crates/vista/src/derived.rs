//! Derived-view registry.
//!
//! A derived view is a named child of another view. It reads the same
//! backing data, but its candidates are the parent's currently visible
//! positions, in the parent's order. Its own filters and comparator apply
//! on top of that.
//!
//! The registry owns its children. A child keeps only a weak link to its
//! parent, so dropping the last handle to a root view releases the whole
//! tree.
//!
//! # Example
//!
//! ```
//! use vista::{DataView, DerivedConfig};
//!
//! let view = DataView::new((1..=10).collect::<Vec<i32>>());
//! let evens = view
//!     .derived()
//!     .create("evens", DerivedConfig::new().filter(|x: &i32| x % 2 == 0))
//!     .unwrap();
//!
//! view.filters().add(|x: &i32| *x > 5);
//! assert_eq!(evens.to_vec(), vec![6, 8, 10]);
//! ```

use vista_core::{Result, ViewError};

use crate::options::DerivedConfig;
use crate::view::DataView;

/// The derived-view registry surface of a view.
///
/// Obtained from [`DataView::derived`].
pub struct Derived<'a, T> {
    view: &'a DataView<T>,
}

impl<'a, T: Clone + Send + Sync + 'static> Derived<'a, T> {
    pub(crate) fn new(view: &'a DataView<T>) -> Self {
        Self { view }
    }

    /// Creates and registers a derived view.
    ///
    /// The new view is computed against the parent's current ordering
    /// before this returns. Creating a view does not notify anyone.
    ///
    /// # Errors
    ///
    /// - [`ViewError::InvalidInput`] if `name` is empty or already taken.
    /// - [`ViewError::DetachedView`] if the parent has been torn down.
    pub fn create(&self, name: impl Into<String>, config: DerivedConfig<T>) -> Result<DataView<T>> {
        let name = name.into();
        if self.view.is_detached() {
            return Err(ViewError::detached(self.view.label()));
        }
        if name.is_empty() {
            return Err(ViewError::invalid_input("create", "derived view name must not be empty"));
        }
        if self.contains(&name) {
            return Err(Self::duplicate(&name));
        }

        // Built outside the registry lock: the initial rebuild runs filters.
        let child = DataView::derived_from(self.view, name, config);

        let mut children = self.view.shared.children.write();
        if children.iter().any(|existing| existing.name() == child.name()) {
            return Err(Self::duplicate(child.label()));
        }
        children.push(child.clone());
        drop(children);

        tracing::debug!(
            target: "vista::derived",
            parent = %self.view.label(),
            view = %child.label(),
            len = child.len(),
            "derived view created"
        );
        Ok(child)
    }

    fn duplicate(name: &str) -> ViewError {
        ViewError::invalid_input("create", format!("derived view '{name}' already exists"))
    }

    /// Looks up a derived view by name.
    pub fn get(&self, name: &str) -> Option<DataView<T>> {
        self.view
            .shared
            .children
            .read()
            .iter()
            .find(|child| child.name() == Some(name))
            .cloned()
    }

    /// Whether a derived view with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.view
            .shared
            .children
            .read()
            .iter()
            .any(|child| child.name() == Some(name))
    }

    /// Removes and tears down a derived view.
    ///
    /// Its subscribers, filters, comparator and own derived views are
    /// released. The backing data and sibling views are untouched. Returns
    /// `false` if no view had that name.
    pub fn delete(&self, name: &str) -> bool {
        let removed = {
            let mut children = self.view.shared.children.write();
            children
                .iter()
                .position(|child| child.name() == Some(name))
                .map(|pos| children.remove(pos))
        };

        match removed {
            Some(child) => {
                child.teardown();
                tracing::debug!(target: "vista::derived", parent = %self.view.label(), view = name, "derived view deleted");
                true
            }
            None => false,
        }
    }

    /// Removes and tears down every derived view.
    pub fn clear(&self) {
        let removed = std::mem::take(&mut *self.view.shared.children.write());
        let count = removed.len();
        for child in removed {
            child.teardown();
        }
        tracing::debug!(target: "vista::derived", parent = %self.view.label(), count, "derived views cleared");
    }

    /// Names in creation order.
    pub fn names(&self) -> Vec<String> {
        self.view
            .shared
            .children
            .read()
            .iter()
            .filter_map(|child| child.name().map(str::to_owned))
            .collect()
    }

    /// Derived views in creation order.
    pub fn views(&self) -> Vec<DataView<T>> {
        self.view.shared.children.read().clone()
    }

    /// Number of derived views.
    pub fn len(&self) -> usize {
        self.view.shared.children.read().len()
    }

    /// Whether there are no derived views.
    pub fn is_empty(&self) -> bool {
        self.view.shared.children.read().is_empty()
    }
}
