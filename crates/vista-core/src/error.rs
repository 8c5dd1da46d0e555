//! Error types for Vista.

/// A specialized Result type for Vista operations.
pub type Result<T> = std::result::Result<T, ViewError>;

/// Errors raised by view operations.
///
/// Every error is raised before the offending operation touches any state,
/// so a view that returned an error is still usable and unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    /// An argument was not acceptable for the operation.
    #[error("Invalid input to {operation}: {reason}")]
    InvalidInput {
        operation: &'static str,
        reason: String,
    },

    /// A configuration value had the wrong shape.
    #[error("Invalid type for '{field}': expected {expected}, found {found}")]
    InvalidType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The view has been torn down and can no longer host derived views.
    #[error("View '{name}' has been torn down")]
    DetachedView { name: String },
}

impl ViewError {
    /// Create an invalid input error.
    pub fn invalid_input(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            operation,
            reason: reason.into(),
        }
    }

    /// Create an invalid type error.
    pub fn invalid_type(field: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        Self::InvalidType {
            field: field.into(),
            expected,
            found,
        }
    }

    /// Create a detached view error.
    pub fn detached(name: impl Into<String>) -> Self {
        Self::DetachedView { name: name.into() }
    }
}
