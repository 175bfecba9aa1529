//! Router subsystem.
//!
//! # Data Flow
//! ```text
//! Navigator (active pushes) ─┐
//! PathSource (passive)  ─────┼→ merged path stream
//! RemainderSource (parent) ──┘        ↓
//!                          driver.rs (base filter, distinct, switch-latest)
//!                                     ↓
//!                          routing::reconcile (reuse prefix, traverse tail)
//!                                     ↓
//!                          commit: dispose → execute → install (activation.rs)
//!                                     ↓
//!                          RouterSubscription (snapshots + remainder)
//! ```
//!
//! # Design Decisions
//! - One driver task per subscription; it alone owns the chain and results
//! - A newer path always wins over an in-flight reconciliation
//! - Failures go to the error handler, never out of the subscription
//! - Dispose before install at every slot

pub mod activation;
mod driver;
pub mod navigator;
mod shutdown;
pub mod source;
pub mod subscription;

use std::sync::Arc;

use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::sync::{mpsc, watch};

use crate::config::{ConfigError, RouterConfig};
use crate::error::{FailureContext, RouterError};
use crate::routing::{Path, ResolutionChain, Resolved, ResolverInput, ViewResolver};
use crate::url_helper::UrlHelper;

use driver::{Driver, ErrorHandler, Executor, PathFilter};
use shutdown::Shutdown;

pub use activation::{
    on_dispose, try_on_dispose, ActivatedResult, Disposable, Slots, Subscription, ViewResult,
};
pub use navigator::{Navigate, Navigator};
pub use source::{ChannelSource, PathSource, PollingSource, RemainderSource};
pub use subscription::{ActiveView, NotFound, RouteSnapshot, RouterSubscription};

/// Pending navigations buffered per subscription before the oldest are
/// skipped.
const NAVIGATION_BUFFER: usize = 64;

/// Orchestrates navigation sources, reconciliation and view activation.
///
/// A router is a reusable description; each [`Router::start`] spawns an
/// independent subscription with its own chain and results.
pub struct Router<V> {
    root: ViewResolver<V>,
    base_path: Path,
    distinct: bool,
    parent: Option<UrlHelper>,
    sources: Vec<Arc<dyn PathSource>>,
    navigator: Navigator,
    on_error: ErrorHandler,
}

impl<V: Clone + Send + Sync + 'static> Router<V> {
    pub fn new(routes: impl Into<ResolverInput<V>>) -> Self {
        Self {
            root: routes.into().into_resolver(),
            base_path: Path::root(),
            distinct: true,
            parent: None,
            sources: Vec::new(),
            navigator: Navigator::new(NAVIGATION_BUFFER),
            on_error: Arc::new(log_failure),
        }
    }

    /// Only handle paths under `base`, and strip it before resolving.
    pub fn with_base_path(mut self, base: impl Into<Path>) -> Self {
        self.base_path = base.into();
        self
    }

    /// Drop consecutive identical paths (on by default).
    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Add a passive path source.
    pub fn with_source<S: PathSource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Nest this router under `parent`, so URLs and links it builds are
    /// absolute.
    pub fn with_parent(mut self, parent: UrlHelper) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&RouterError, &FailureContext) + Send + Sync + 'static,
    {
        self.on_error = Arc::new(handler);
        self
    }

    /// Handle for programmatic navigation. Paths are absolute, including
    /// the base path.
    pub fn navigator(&self) -> Navigator {
        self.navigator.clone()
    }

    /// Start routing. Must be called within a tokio runtime.
    ///
    /// `executor` is invoked once per newly activated chain position and
    /// returns the resource to dispose when the position is superseded or
    /// the subscription ends. Snapshots queue until read, see
    /// [`RouterSubscription`].
    pub fn start<F>(&self, executor: F) -> RouterSubscription<V>
    where
        F: Fn(&Resolved<V>, &UrlHelper) -> ViewResult + Send + Sync + 'static,
    {
        let executor: Executor<V> = Arc::new(executor);
        let (snapshot_tx, snapshot_rx) = mpsc::unbounded_channel();
        let (remainder_tx, remainder_rx) = watch::channel(None);
        let (shutdown, shutdown_rx) = Shutdown::pair();

        // Subscribe before spawning so no navigation pushed after `start`
        // returns is missed.
        let paths = self.paths();

        let root_url = match &self.parent {
            Some(parent) => parent.child(self.base_path.clone()),
            None => UrlHelper::root(
                self.base_path.clone(),
                Some(Arc::new(self.navigator.clone())),
            ),
        };

        let driver = Driver {
            root: self.root.clone(),
            filter: PathFilter::new(self.base_path.clone(), self.distinct),
            root_url,
            executor,
            on_error: self.on_error.clone(),
            snapshots: snapshot_tx,
            remainder: remainder_tx,
            chain: ResolutionChain::new(),
            slots: Slots::new(),
        };
        let task = tokio::spawn(driver.run(paths, shutdown_rx));

        RouterSubscription::new(snapshot_rx, remainder_rx, shutdown, task)
    }

    fn paths(&self) -> BoxStream<'static, Path> {
        let streams = std::iter::once(self.navigator.paths())
            .chain(self.sources.iter().map(|source| source.paths()));
        stream::select_all(streams).boxed()
    }
}

impl Router<String> {
    /// Build a router from a validated configuration. Views are the
    /// configured view names.
    pub fn from_config(config: &RouterConfig) -> Result<Self, ConfigError> {
        crate::config::validate_config(config).map_err(ConfigError::Validation)?;
        let base_path = Path::parse(&config.router.base_path);
        let routes = config.route_input().map_err(|e| ConfigError::Validation(vec![e.into()]))?;
        Ok(Router::new(routes)
            .with_base_path(base_path)
            .with_distinct(config.router.distinct))
    }
}

fn log_failure(error: &RouterError, context: &FailureContext) {
    tracing::error!(
        error = %error,
        path = %context.path,
        unresolved = %context.unresolved,
        depth = context.resolved_depth,
        "Routing failure"
    );
}
