//! Construction-time configuration.
//!
//! [`ViewOptions`] pre-seeds a view's registries: the filters, comparator
//! and direction it starts with. The same struct configures derived views,
//! under the [`DerivedConfig`] alias.
//!
//! Options can also pick up loosely typed [`ViewSettings`], such as values
//! read from an application's settings file. Those are checked before they
//! are applied.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use vista_core::{Result, ViewError};

use crate::filter::FilterEntry;
use crate::sort::{compare_by_key, CompareFn};

/// Initial state for a view.
pub struct ViewOptions<T> {
    filters: Vec<FilterEntry<T>>,
    compare: Option<CompareFn<T>>,
    reversed: bool,
}

/// Initial state for a derived view.
pub type DerivedConfig<T> = ViewOptions<T>;

impl<T> Default for ViewOptions<T> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            compare: None,
            reversed: false,
        }
    }
}

impl<T> Clone for ViewOptions<T> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            compare: self.compare.clone(),
            reversed: self.reversed,
        }
    }
}

impl<T> std::fmt::Debug for ViewOptions<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewOptions")
            .field("filters", &self.filters.len())
            .field("sorted", &self.compare.is_some())
            .field("reversed", &self.reversed)
            .finish()
    }
}

impl<T: 'static> ViewOptions<T> {
    /// Options with no filters, no comparator, forward traversal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter predicate.
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter_entry(FilterEntry::new(predicate))
    }

    /// Adds a filter entry, keeping its priority.
    pub fn filter_entry(mut self, entry: FilterEntry<T>) -> Self {
        self.filters.push(entry);
        self
    }

    /// Sets the comparator.
    pub fn sort<F>(mut self, compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.compare = Some(Arc::new(compare));
        self
    }

    /// Sets the comparator from an extracted key.
    pub fn sort_by_key<K, F>(mut self, key: F) -> Self
    where
        K: Ord + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.compare = Some(compare_by_key(key));
        self
    }

    /// Sets or removes a shared comparator.
    pub fn sort_fn(mut self, compare: Option<CompareFn<T>>) -> Self {
        self.compare = compare;
        self
    }

    /// Sets the traversal direction.
    pub fn reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    /// Applies loosely typed settings.
    ///
    /// Recognised keys:
    ///
    /// | key        | type   |
    /// |------------|--------|
    /// | `reversed` | `Bool` |
    ///
    /// Unknown keys are logged and ignored.
    ///
    /// # Errors
    ///
    /// [`ViewError::InvalidType`] if a recognised key holds the wrong type.
    /// The options are consumed only on success.
    pub fn apply_settings(self, settings: &ViewSettings) -> Result<Self> {
        let mut reversed = self.reversed;
        for (key, value) in settings.iter() {
            match key {
                "reversed" => match value {
                    SettingValue::Bool(flag) => reversed = *flag,
                    other => return Err(ViewError::invalid_type(key, "bool", other.type_name())),
                },
                _ => {
                    tracing::warn!(target: "vista::view", key, "ignoring unknown view setting");
                }
            }
        }
        Ok(self.reversed(reversed))
    }

    pub(crate) fn into_parts(self) -> (Vec<FilterEntry<T>>, Option<CompareFn<T>>, bool) {
        (self.filters, self.compare, self.reversed)
    }
}

/// A loosely typed setting value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A string.
    Str(String),
}

impl SettingValue {
    /// Human-readable name of the value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Str(_) => "string",
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// String-keyed settings for a view, iterated in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSettings {
    values: BTreeMap<String, SettingValue>,
}

impl ViewSettings {
    /// Empty settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> Option<SettingValue> {
        self.values.insert(key.into(), value.into())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Looks up a value.
    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.values.get(key)
    }

    /// Iterates in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of settings.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no settings.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<SettingValue>> FromIterator<(K, V)> for ViewSettings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_state() {
        let options = ViewOptions::<i32>::new()
            .filter(|x| *x > 0)
            .filter_entry(FilterEntry::new(|x: &i32| x % 2 == 0).with_priority(1))
            .sort(|a, b| b.cmp(a))
            .reversed(true);

        let (filters, compare, reversed) = options.into_parts();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[1].priority(), Some(1));
        assert!(compare.is_some());
        assert!(reversed);
    }

    #[test]
    fn test_apply_settings_reversed() {
        let settings = ViewSettings::new().with("reversed", true);
        let options = ViewOptions::<i32>::new().apply_settings(&settings).unwrap();
        assert!(options.into_parts().2);
    }

    #[test]
    fn test_apply_settings_wrong_type() {
        let settings: ViewSettings = [("reversed", "yes")].into_iter().collect();
        let err = ViewOptions::<i32>::new().apply_settings(&settings).unwrap_err();
        assert_eq!(err, ViewError::invalid_type("reversed", "bool", "string"));
    }

    #[test]
    fn test_debug_summarises_state() {
        let options = ViewOptions::<i32>::new().filter(|x| *x > 0).reversed(true);
        assert_eq!(
            format!("{options:?}"),
            "ViewOptions { filters: 1, sorted: false, reversed: true }"
        );
    }

    #[test]
    fn test_apply_settings_ignores_unknown_keys() {
        let settings = ViewSettings::new().with("page_size", 50_i64);
        let options = ViewOptions::<i32>::new()
            .reversed(true)
            .apply_settings(&settings)
            .unwrap();
        assert!(options.into_parts().2);
    }
}
