//! Observable, non-destructive views over in-memory sequences.
//!
//! A [`DataView<T>`] shows a filtered and sorted projection of a shared
//! sequence without copying or reordering it. Views notify their
//! subscribers synchronously after every change, and can host named
//! derived views that further narrow what their parent shows.
//!
//! # Core Types
//!
//! - [`DataView`]: the view handle
//! - [`Sequence`]: shared backing data
//! - [`DataSource`]: what a view is built from or refilled with
//! - [`Filters`], [`Sort`], [`Derived`]: the registry surfaces of a view
//! - [`ViewOptions`] / [`DerivedConfig`]: initial registry state
//!
//! # Example
//!
//! ```
//! use vista::{DataView, DerivedConfig, Sequence};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let data = Sequence::new(vec![5, 3, 8, 1, 9, 2]);
//! let view = DataView::new(&data);
//!
//! let renders = Arc::new(AtomicUsize::new(0));
//! let renders_clone = renders.clone();
//! view.subscribe(move |view| {
//!     renders_clone.fetch_add(1, Ordering::SeqCst);
//!     let _visible: Vec<i32> = view.to_vec();
//! });
//!
//! view.sort().set(|a: &i32, b: &i32| a.cmp(b));
//! assert_eq!(view.to_vec(), vec![1, 2, 3, 5, 8, 9]);
//!
//! let big = view
//!     .derived()
//!     .create("big", DerivedConfig::new().filter(|x: &i32| *x > 4))
//!     .unwrap();
//! assert_eq!(big.to_vec(), vec![5, 8, 9]);
//!
//! // The data itself was never touched.
//! assert_eq!(data.to_vec(), vec![5, 3, 8, 1, 9, 2]);
//! assert_eq!(renders.load(Ordering::SeqCst), 2);
//! ```
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │  Filters    │───>│             │───>│ Subscribers │
//! │  Sort       │    │  DataView   │    └─────────────┘
//! └─────────────┘    │  (ordering) │    ┌─────────────┐
//!       ┌───────────>│             │───>│  Derived    │──> child DataViews
//!       │            └─────────────┘    └─────────────┘
//! ┌─────────────┐
//! │  Sequence   │  shared by the root and every derived view
//! └─────────────┘
//! ```

mod derived;
mod filter;
mod index;
mod options;
pub mod prelude;
mod sort;
mod store;
mod view;

pub use derived::Derived;
pub use filter::{FilterEntry, FilterFn, FilterId, Filters};
pub use index::Iter;
pub use options::{DerivedConfig, SettingValue, ViewOptions, ViewSettings};
pub use sort::{compare_by_key, CompareFn, Sort};
pub use store::{DataSource, Sequence};
pub use view::{DataView, ViewSubscription};

pub use vista_core::{Result, ViewError};
