//! The per-subscription driver task.
//!
//! # Loop
//! ```text
//! idle:       wait for an admitted path (or shutdown)
//! reconciling: race the reconciliation against the next admitted path
//!     newer path wins → drop the in-flight future, restart with the newer path
//!     reconciliation wins → commit
//! commit:     dispose beyond the reused prefix, execute and install the new
//!             tail, emit a snapshot and the remainder
//! shutdown / all sources ended → dispose everything, stop
//! ```
//!
//! The root `UrlHelper` keeps a navigator handle alive for links, so a
//! router's merged stream never ends on its own. In practice teardown comes
//! from the subscription handle.
//!
//! The driver exclusively owns the committed chain and the activated results.
//! An in-flight reconciliation never touches either, so dropping it is
//! always safe.

use std::sync::Arc;

use futures_util::stream::{BoxStream, StreamExt};
use tokio::sync::{broadcast, mpsc, watch};

use crate::error::{FailureContext, RouterError};
use crate::observability::metrics;
use crate::router::activation::{ActivatedResult, DisposalFailure, Slots, ViewResult};
use crate::router::subscription::{ActiveView, NotFound, RouteSnapshot};
use crate::routing::{
    reconcile, Path, Reconciliation, ResolutionChain, Resolved, Traversal, TraversalEnd,
    ViewResolver,
};
use crate::url_helper::UrlHelper;

/// Turns one newly resolved level into a disposable result.
pub(crate) type Executor<V> = Arc<dyn Fn(&Resolved<V>, &UrlHelper) -> ViewResult + Send + Sync>;

/// Receives every non-fatal routing failure.
pub(crate) type ErrorHandler = Arc<dyn Fn(&RouterError, &FailureContext) + Send + Sync>;

/// Admission rules for incoming paths.
pub(crate) struct PathFilter {
    base: Path,
    distinct: bool,
    last: Option<Path>,
}

impl PathFilter {
    pub(crate) fn new(base: Path, distinct: bool) -> Self {
        Self {
            base,
            distinct,
            last: None,
        }
    }

    /// Strip the base path and drop repeats. `None` means ignore the path.
    pub(crate) fn admit(&mut self, path: Path) -> Option<Path> {
        let Some(relative) = path.strip_prefix(&self.base) else {
            tracing::debug!(path = %path, base = %self.base, "Ignoring path outside base");
            return None;
        };
        if self.distinct && self.last.as_ref() == Some(&relative) {
            tracing::trace!(path = %relative, "Ignoring repeated path");
            return None;
        }
        self.last = Some(relative.clone());
        Some(relative)
    }
}

pub(crate) struct Driver<V> {
    pub(crate) root: ViewResolver<V>,
    pub(crate) filter: PathFilter,
    pub(crate) root_url: UrlHelper,
    pub(crate) executor: Executor<V>,
    pub(crate) on_error: ErrorHandler,
    pub(crate) snapshots: mpsc::UnboundedSender<RouteSnapshot<V>>,
    pub(crate) remainder: watch::Sender<Option<Path>>,
    pub(crate) chain: ResolutionChain<V>,
    pub(crate) slots: Slots<V>,
}

impl<V: Clone + Send + Sync + 'static> Driver<V> {
    pub(crate) async fn run(
        mut self,
        mut paths: BoxStream<'static, Path>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        tracing::info!(base = %self.filter.base, "Router subscription started");

        let mut pending: Option<Path> = None;
        let mut exhausted = false;

        'outer: loop {
            let path = match pending.take() {
                Some(path) => path,
                None if exhausted => break,
                None => tokio::select! {
                    biased;
                    _ = shutdown.recv() => break,
                    next = paths.next() => match next {
                        Some(path) => match self.filter.admit(path) {
                            Some(path) => path,
                            None => continue,
                        },
                        None => break,
                    },
                },
            };

            metrics::record_navigation();
            let reconciling = reconcile(&path, &self.chain, &self.root);
            tokio::pin!(reconciling);

            let outcome = loop {
                tokio::select! {
                    biased;
                    _ = shutdown.recv() => break 'outer,
                    next = paths.next(), if !exhausted => match next {
                        Some(candidate) => {
                            if let Some(newer) = self.filter.admit(candidate) {
                                tracing::debug!(superseded = %path, path = %newer, "Navigation superseded");
                                metrics::record_superseded();
                                pending = Some(newer);
                                continue 'outer;
                            }
                        }
                        None => exhausted = true,
                    },
                    outcome = &mut reconciling => break outcome,
                }
            };

            self.commit(path, outcome);
        }

        self.teardown();
    }

    fn commit(&mut self, path: Path, outcome: Reconciliation<V>) {
        let Reconciliation { reused, tail } = outcome;
        let Traversal { entries, end } = tail;

        self.chain.truncate(reused);
        self.dispose_from(reused, &path);

        let mut installed = 0;
        let mut executor_failed = false;
        for entry in entries {
            let depth = self.chain.len();
            let parent = self
                .slots
                .last()
                .map(|result| result.url.clone())
                .unwrap_or_else(|| self.root_url.clone());
            let url = parent.child(entry.resolution.applied_path.clone());

            match (self.executor)(&entry.resolution, &url) {
                Ok(disposable) => {
                    let result = ActivatedResult::activate(
                        url,
                        entry.resolution.view.clone(),
                        entry.resolution.params.clone(),
                        disposable,
                    );
                    let failures = self.slots.install(depth, result);
                    self.report_disposals(&path, failures);
                    self.chain.push(entry);
                    installed += 1;
                }
                Err(source) => {
                    let error = RouterError::Execution {
                        depth,
                        path: url.to_absolute(),
                        source,
                    };
                    let context = FailureContext {
                        path: path.clone(),
                        unresolved: path.skip(self.chain.consumed()),
                        resolved_depth: depth,
                    };
                    self.report(&error, &context);
                    executor_failed = true;
                    break;
                }
            }
        }

        let consumed = self.chain.consumed();
        let remainder = path.skip(consumed);
        let not_found = match end {
            TraversalEnd::NotFound { .. } if !executor_failed => {
                metrics::record_not_found();
                Some(NotFound {
                    matched: path.take(consumed),
                    unmatched: remainder.clone(),
                })
            }
            TraversalEnd::Failed { remaining, error } if !executor_failed => {
                let error = RouterError::Resolution {
                    depth: self.chain.len(),
                    path: remaining.clone(),
                    source: error,
                };
                let context = FailureContext {
                    path: path.clone(),
                    unresolved: remaining,
                    resolved_depth: self.chain.len(),
                };
                self.report(&error, &context);
                None
            }
            _ => None,
        };

        metrics::record_activated(installed);
        metrics::record_active_views(self.slots.len());
        tracing::debug!(
            path = %path,
            reused,
            installed,
            remainder = %remainder,
            not_found = not_found.is_some(),
            "Navigation committed"
        );

        let snapshot = RouteSnapshot {
            path,
            views: self
                .slots
                .iter()
                .enumerate()
                .map(|(depth, result)| ActiveView::of(depth, result))
                .collect(),
            remainder: remainder.clone(),
            not_found,
        };
        if self.snapshots.send(snapshot).is_err() {
            tracing::trace!("Snapshot receiver gone");
        }
        self.remainder.send_replace(Some(remainder));
    }

    /// Dispose every result at `depth` and deeper.
    fn dispose_from(&mut self, depth: usize, path: &Path) {
        let before = self.slots.len();
        let failures = self.slots.truncate_at(depth);
        metrics::record_disposed(before - self.slots.len());
        self.report_disposals(path, failures);
    }

    fn report_disposals(&self, path: &Path, failures: Vec<DisposalFailure>) {
        for failure in failures {
            tracing::warn!(path = %failure.path, error = %failure.error, "View disposal failed");
            let error = RouterError::Disposal {
                path: failure.path,
                source: failure.error,
            };
            let context = FailureContext {
                path: path.clone(),
                unresolved: Path::root(),
                resolved_depth: failure.depth,
            };
            self.report(&error, &context);
        }
    }

    fn report(&self, error: &RouterError, context: &FailureContext) {
        metrics::record_error(error);
        (self.on_error)(error, context);
    }

    fn teardown(&mut self) {
        self.chain.truncate(0);
        self.dispose_from(0, &Path::root());
        metrics::record_active_views(0);
        tracing::info!(base = %self.filter.base, "Router subscription stopped");
    }
}
