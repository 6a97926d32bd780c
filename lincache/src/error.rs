use thiserror::Error;

/// Errors reported by [`LinkedMap`](crate::LinkedMap) and
/// [`Cache`](crate::Cache).
///
/// Every error is raised synchronously by the call that broke the contract and
/// none of them are retried internally. Only [`Error::ResourceDisposed`] is
/// fatal to the instance; the others only fail the current operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A configuration value failed validation.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Name of the offending argument.
        name: &'static str,
        /// Human readable description of the failed check.
        reason: String,
    },

    /// The cache was used after [`Cache::dispose`](crate::Cache::dispose).
    #[error("cache has already been disposed")]
    ResourceDisposed,

    /// The map was structurally modified while a traversal was in flight.
    #[error("map was modified during traversal (generation {expected}, now {found})")]
    ConcurrentModification {
        /// Generation captured when the traversal started.
        expected: u64,
        /// Generation observed at the failing step.
        found: u64,
    },

    /// The head/tail/link bookkeeping is inconsistent.
    #[error("internal invariant violated: {0}")]
    InternalInvariantViolation(&'static str),
}

impl Error {
    pub(crate) fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// Returns `true` if the instance that produced this error can no longer
    /// be used.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ResourceDisposed)
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
