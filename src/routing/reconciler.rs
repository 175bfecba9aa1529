//! Reconciliation of a new path against the previous chain.
//!
//! # Algorithm
//! ```text
//! previous chain, head first:
//!     position reusable for the remaining path?
//!         yes → keep it, strip its applied prefix, move on
//!         no  → stop; re-traverse from this depth with the resolver
//!               that produced this position (root at depth 0)
//! all positions reused → traverse the rest with the last continuation
//! ```
//!
//! Reuse is purely structural. Resolved parameter values are not compared,
//! so a parameter-only change at a reused position keeps the position.

use std::future::Future;

use crate::routing::chain::{traverse, ResolutionChain, Traversal};
use crate::routing::path::Path;
use crate::routing::resolver::{Resolved, ViewResolver};

/// How much of the previous chain survives, and where to resume.
pub struct ReusePlan<V> {
    pub reused: usize,
    /// Path left after the reused positions.
    pub remaining: Path,
    /// Resolver for the first non-reused depth.
    pub resolver: Option<ViewResolver<V>>,
}

/// Output of a reconciliation.
pub struct Reconciliation<V> {
    /// Leading positions of the previous chain kept unchanged.
    pub reused: usize,
    /// Newly resolved positions, starting at depth `reused`.
    pub tail: Traversal<V>,
}

/// Returns true if a prior resolution can stand for `remaining`.
pub fn is_reusable<V>(resolution: &Resolved<V>, remaining: &Path) -> bool {
    if remaining.is_empty() || resolution.view.is_none() {
        return false;
    }
    let applied = &resolution.applied_path;
    // An index position never survives a non-empty remainder.
    if applied.is_empty() {
        return false;
    }
    remaining.starts_with(applied.segments())
}

/// Walk the previous chain and decide the reused prefix.
pub fn plan<V>(path: &Path, previous: &ResolutionChain<V>, root: &ViewResolver<V>) -> ReusePlan<V> {
    let mut remaining = path.clone();
    let mut resolver = Some(root.clone());
    let mut reused = 0;

    for entry in previous.entries() {
        if !is_reusable(&entry.resolution, &remaining) {
            resolver = Some(entry.resolver.clone());
            break;
        }
        remaining = remaining.skip(entry.resolution.applied_path.len());
        resolver = entry.resolution.continuation.clone();
        reused += 1;
    }

    ReusePlan {
        reused,
        remaining,
        resolver,
    }
}

/// Recompute the chain for `path`, reusing the unchanged prefix of
/// `previous`.
///
/// The reuse decision is taken eagerly; the returned future owns everything
/// it needs, so it can be dropped at any point without side effects.
pub fn reconcile<V: Send + 'static>(
    path: &Path,
    previous: &ResolutionChain<V>,
    root: &ViewResolver<V>,
) -> impl Future<Output = Reconciliation<V>> + Send + 'static {
    let ReusePlan {
        reused,
        remaining,
        resolver,
    } = plan(path, previous, root);

    tracing::debug!(path = %path, reused, remaining = %remaining, "Reconciling");

    async move {
        let tail = traverse(remaining, resolver).await;
        Reconciliation { reused, tail }
    }
}
