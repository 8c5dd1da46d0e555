//! Commonly used types.
//!
//! ```
//! use vista::prelude::*;
//!
//! let view = DataView::new(vec![1, 2, 3]);
//! view.filters().add_entry(FilterEntry::new(|x: &i32| *x != 2).with_priority(0));
//! assert_eq!(view.to_vec(), vec![1, 3]);
//! ```

pub use crate::{
    DataSource, DataView, DerivedConfig, FilterEntry, FilterId, Sequence, ViewError, ViewOptions,
    ViewSettings,
};
