//! Router error definitions.

use thiserror::Error;

use crate::routing::{BoxError, Path};

/// Failures surfaced to the router's error handler.
///
/// None of these terminate a router subscription. Not-found is not an error
/// and is reported as data on the emitted snapshot.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A view resolver failed while computing a level.
    #[error("failed to resolve `{path}` at depth {depth}: {source}")]
    Resolution {
        depth: usize,
        /// The unresolved path at the failing level.
        path: Path,
        #[source]
        source: BoxError,
    },

    /// The view executor failed to build a result.
    #[error("view executor failed for `{path}` at depth {depth}: {source}")]
    Execution {
        depth: usize,
        /// Absolute path of the level that failed.
        path: Path,
        #[source]
        source: BoxError,
    },

    /// A result's disposal failed. Sibling disposals still ran.
    #[error("failed to dispose view at `{path}`: {source}")]
    Disposal {
        /// Absolute path of the disposed level.
        path: Path,
        #[source]
        source: BoxError,
    },
}

impl RouterError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RouterError::Resolution { .. } => "resolution",
            RouterError::Execution { .. } => "execution",
            RouterError::Disposal { .. } => "disposal",
        }
    }
}

/// Where a failure happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureContext {
    /// The navigated path being processed, empty during teardown.
    pub path: Path,
    /// Suffix of `path` left unresolved because of the failure.
    pub unresolved: Path,
    /// Number of chain positions installed when the failure was handled.
    pub resolved_depth: usize,
}
