//! Programmatic navigation.

use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use url::Url;

use crate::routing::Path;

/// Something that can be told to navigate to an absolute path.
pub trait Navigate: Send + Sync {
    fn execute(&self, path: Path);
}

/// Active navigation source of a router.
///
/// Cheap to clone. Every running subscription of the router receives each
/// pushed path.
#[derive(Debug, Clone)]
pub struct Navigator {
    tx: broadcast::Sender<Path>,
}

impl Navigator {
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Navigate to a `/`-separated path.
    pub fn execute_str(&self, path: &str) {
        self.execute(Path::parse(path));
    }

    /// Navigate to `href` if it stays on the origin of `current`.
    ///
    /// Returns false for foreign or unparsable links, which the caller should
    /// let through untouched.
    pub fn follow_href(&self, current: &Url, href: &str) -> bool {
        match Path::from_href(current, href) {
            Some(path) => {
                self.execute(path);
                true
            }
            None => false,
        }
    }

    pub(crate) fn paths(&self) -> BoxStream<'static, Path> {
        stream::unfold(self.tx.subscribe(), |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(path) => return Some((path, rx)),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Navigation receiver lagged, skipping to latest");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }
}

impl Navigate for Navigator {
    fn execute(&self, path: Path) {
        if self.tx.send(path).is_err() {
            tracing::debug!("Navigation dropped: router has no active subscription");
        }
    }
}
