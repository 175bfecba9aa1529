//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at configuration time):
//!     ResolverInput (function | routes | path map)
//!     → route.rs (compile descriptors, memoize component routes)
//!     → resolver.rs (uniform ViewResolver)
//!
//! Per navigation:
//!     new Path + previous ResolutionChain
//!     → reconciler.rs (keep the reusable prefix)
//!     → chain.rs (traverse the changed suffix level by level)
//!         → matcher.rs (evaluate template segments)
//!     → Return: reused count + newly resolved tail
//! ```
//!
//! # Design Decisions
//! - Routes compiled once, immutable afterwards
//! - First match wins; no backtracking once a route's template matched
//! - Not-found is data, not an error
//! - Reuse compares applied paths only, never params

pub mod chain;
pub mod matcher;
pub mod path;
pub mod reconciler;
pub mod resolver;
pub mod route;

pub use chain::{traverse, ChainEntry, ResolutionChain, Traversal, TraversalEnd};
pub use matcher::{Params, PathMatch, PathMatcher, PatternError, Segment, SegmentMatcher};
pub use path::Path;
pub use reconciler::{reconcile, Reconciliation};
pub use resolver::{
    combine, resolver_fn, BoxError, Resolve, ResolveResult, Resolved, ResolverInput, ViewResolution,
    ViewResolver,
};
pub use route::{Component, RouteDescriptor, RouteEntry, RouteInput};
