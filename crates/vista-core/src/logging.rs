//! Logging facilities for Vista.
//!
//! Vista uses the `tracing` crate for instrumentation. Nothing is printed
//! unless the application installs a subscriber:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("vista=debug")
//!         .init();
//! }
//! ```
//!
//! Recomputes are traced at `trace` level, registry mutations at `debug`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Performance spans.
    pub const PERF: &str = "vista::perf";
    /// View facade target (data replacement, reversal).
    pub const VIEW: &str = "vista::view";
    /// Ordering rebuild target.
    pub const INDEX: &str = "vista::index";
    /// Filter and sort registry target.
    pub const REGISTRY: &str = "vista::registry";
    /// Derived view registry target.
    pub const DERIVED: &str = "vista::derived";
    /// Subscription fan-out target.
    pub const SUBSCRIPTION: &str = "vista::subscription";
}

/// A performance tracing span guard.
///
/// The span is entered on creation and exited when the guard is dropped,
/// so subscribers with timing layers report how long the guarded work took.
///
/// ```ignore
/// {
///     let _span = PerfSpan::new("rebuild");
///     // ... rebuild the ordering ...
/// }
/// ```
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span for the named operation.
    pub fn new(operation: &'static str) -> Self {
        let span = tracing::trace_span!(target: "vista::perf", "perf", operation);
        Self {
            span: span.entered(),
        }
    }
}
