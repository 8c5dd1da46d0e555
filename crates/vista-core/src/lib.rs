//! Core systems for Vista.
//!
//! This crate provides the pieces of the Vista view engine that do not
//! depend on the element type being viewed:
//!
//! - **Errors**: [`ViewError`] and the crate-wide [`Result`] alias
//! - **Subscriptions**: ordered, synchronous handler fan-out with
//!   idempotent unsubscribe ([`Subscribers`], [`Subscription`])
//! - **Logging**: `tracing` targets and [`PerfSpan`]
//!
//! # Example
//!
//! ```
//! use vista_core::{Subscribers, ViewError};
//!
//! let changed = Subscribers::<usize>::new();
//! let subscription = changed.subscribe(&0, |len| println!("visible: {len}"));
//! changed.notify(&3);
//! subscription.unsubscribe();
//!
//! let err = ViewError::invalid_input("create", "name must not be empty");
//! assert!(err.to_string().contains("create"));
//! ```

mod error;
pub mod logging;
pub mod subscription;

pub use error::{Result, ViewError};
pub use logging::PerfSpan;
pub use subscription::{Handler, Subscribers, Subscription, SubscriptionGuard};
