//! Subscription handle and the snapshots it yields.

use std::fmt;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::router::activation::ActivatedResult;
use crate::router::shutdown::Shutdown;
use crate::router::source::RemainderSource;
use crate::routing::{Params, Path};
use crate::url_helper::UrlHelper;

/// One installed chain position, as seen by consumers.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveView<V> {
    /// Identity of the underlying result. Unchanged while the position is
    /// reused.
    pub id: Uuid,
    pub depth: usize,
    /// Absolute path through this position.
    pub path: Path,
    #[serde(skip)]
    pub url: UrlHelper,
    pub view: Option<V>,
    pub params: Params,
}

impl<V: Clone> ActiveView<V> {
    pub(crate) fn of(depth: usize, result: &ActivatedResult<V>) -> Self {
        Self {
            id: result.id,
            depth,
            path: result.url.to_absolute(),
            url: result.url.clone(),
            view: result.view.clone(),
            params: result.params.clone(),
        }
    }
}

/// A navigation that stopped on a segment no route matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotFound {
    /// Portion of the path that did resolve.
    pub matched: Path,
    pub unmatched: Path,
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no route for `{}` under `{}`", self.unmatched, self.matched)
    }
}

/// Router state after processing one navigation.
#[derive(Debug, Clone, Serialize)]
pub struct RouteSnapshot<V> {
    /// The navigated path, relative to the router's base path.
    pub path: Path,
    /// Installed results, root first.
    pub views: Vec<ActiveView<V>>,
    /// Unconsumed suffix of `path`.
    pub remainder: Path,
    pub not_found: Option<NotFound>,
}

impl<V> RouteSnapshot<V> {
    /// The deepest installed view.
    pub fn leaf(&self) -> Option<&ActiveView<V>> {
        self.views.last()
    }

    pub fn is_not_found(&self) -> bool {
        self.not_found.is_some()
    }
}

/// A running router subscription.
///
/// Dropping the handle tears the subscription down in the background;
/// [`RouterSubscription::unsubscribe`] does the same and waits until every
/// result has been disposed. This is the only way a subscription ends: the
/// router's own navigator stays open for as long as views can link through
/// it.
///
/// Every committed navigation queues one snapshot, unbounded. Consumers that
/// only follow [`RouterSubscription::remainder`] must still drain
/// [`RouterSubscription::next`] or [`RouterSubscription::try_next`].
pub struct RouterSubscription<V> {
    snapshots: mpsc::UnboundedReceiver<RouteSnapshot<V>>,
    remainder: watch::Receiver<Option<Path>>,
    shutdown: Shutdown,
    task: Option<JoinHandle<()>>,
}

impl<V> RouterSubscription<V> {
    pub(crate) fn new(
        snapshots: mpsc::UnboundedReceiver<RouteSnapshot<V>>,
        remainder: watch::Receiver<Option<Path>>,
        shutdown: Shutdown,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            snapshots,
            remainder,
            shutdown,
            task: Some(task),
        }
    }

    /// Next emitted snapshot. `None` once the subscription has stopped.
    pub async fn next(&mut self) -> Option<RouteSnapshot<V>> {
        self.snapshots.recv().await
    }

    /// Next snapshot if one is already queued.
    pub fn try_next(&mut self) -> Option<RouteSnapshot<V>> {
        self.snapshots.try_recv().ok()
    }

    /// Unconsumed remainder of the last committed navigation. `None` until
    /// the first commit.
    pub fn remainder(&self) -> Option<Path> {
        self.remainder.borrow().clone()
    }

    /// Source for a child router nested under the deepest installed view.
    pub fn remainder_source(&self) -> RemainderSource {
        RemainderSource::new(self.remainder.clone())
    }

    /// Stop routing and wait until every activated result is disposed.
    pub async fn unsubscribe(mut self) {
        if !self.shutdown.trigger() {
            tracing::debug!("Router driver already stopped");
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Router driver task failed");
            }
        }
    }
}

impl<V> Drop for RouterSubscription<V> {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.shutdown.trigger();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let nf = NotFound {
            matched: Path::from(["a"]),
            unmatched: Path::from(["x", "y"]),
        };
        assert_eq!(nf.to_string(), "no route for `/x/y` under `/a`");
    }

    #[test]
    fn test_snapshot_serializes_without_url() {
        let snapshot = RouteSnapshot {
            path: Path::from(["a"]),
            views: vec![ActiveView {
                id: Uuid::nil(),
                depth: 0,
                path: Path::from(["a"]),
                url: UrlHelper::root(Path::from(["a"]), None),
                view: Some("A"),
                params: Params::new(),
            }],
            remainder: Path::root(),
            not_found: None,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["views"][0]["view"], "A");
        assert_eq!(json["views"][0]["path"], serde_json::json!(["a"]));
        assert!(json["views"][0].get("url").is_none());
        assert!(json["not_found"].is_null());
    }
}
