//! Activated results and their per-position slots.
//!
//! Every chain position that the router installs owns exactly one
//! [`ActivatedResult`]. [`Slots`] is the router-owned array of those results,
//! index-addressed by depth. Disposal is consuming, so a result can never be
//! disposed twice; results that are dropped without an explicit disposal are
//! disposed on drop.

use std::fmt;

use uuid::Uuid;

use crate::routing::{BoxError, Params, Path};
use crate::url_helper::UrlHelper;

/// Resource handed back by the view executor for one chain position.
pub trait Disposable: Send {
    /// Release the resource.
    fn dispose(self: Box<Self>) -> Result<(), BoxError>;

    /// Post-construction hook, invoked once right after the result is built.
    /// Returned subscriptions are cancelled before [`Disposable::dispose`].
    fn activate(&mut self) -> Vec<Subscription> {
        Vec::new()
    }
}

/// Nothing to release.
impl Disposable for () {
    fn dispose(self: Box<Self>) -> Result<(), BoxError> {
        Ok(())
    }
}

/// What an executor returns for one position.
pub type ViewResult = Result<Box<dyn Disposable>, BoxError>;

struct DisposeFn<F>(F);

impl<F> Disposable for DisposeFn<F>
where
    F: FnOnce() -> Result<(), BoxError> + Send,
{
    fn dispose(self: Box<Self>) -> Result<(), BoxError> {
        (self.0)()
    }
}

/// A disposable that runs `f` once.
pub fn on_dispose<F>(f: F) -> Box<dyn Disposable>
where
    F: FnOnce() + Send + 'static,
{
    Box::new(DisposeFn(move || {
        f();
        Ok(())
    }))
}

/// A disposable whose cleanup may fail.
pub fn try_on_dispose<F>(f: F) -> Box<dyn Disposable>
where
    F: FnOnce() -> Result<(), BoxError> + Send + 'static,
{
    Box::new(DisposeFn(f))
}

/// Cancellable handle returned by [`Disposable::activate`].
pub struct Subscription {
    cancel: Box<dyn FnOnce() + Send>,
}

impl Subscription {
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            cancel: Box::new(cancel),
        }
    }

    pub fn unsubscribe(self) {
        (self.cancel)()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscription")
    }
}

/// The live output for one chain position.
pub struct ActivatedResult<V> {
    /// Stable for as long as the position is reused.
    pub id: Uuid,
    pub url: UrlHelper,
    pub view: Option<V>,
    pub params: Params,
    disposable: Option<Box<dyn Disposable>>,
    subscriptions: Vec<Subscription>,
}

impl<V> ActivatedResult<V> {
    /// Wrap an executor result, running its activation hook.
    pub fn activate(
        url: UrlHelper,
        view: Option<V>,
        params: Params,
        mut disposable: Box<dyn Disposable>,
    ) -> Self {
        let subscriptions = disposable.activate();
        Self {
            id: Uuid::new_v4(),
            url,
            view,
            params,
            disposable: Some(disposable),
            subscriptions,
        }
    }

    /// Cancel activation subscriptions, then dispose the resource.
    pub fn dispose(mut self) -> Result<(), BoxError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), BoxError> {
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
        match self.disposable.take() {
            Some(disposable) => disposable.dispose(),
            None => Ok(()),
        }
    }
}

impl<V> Drop for ActivatedResult<V> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::error!(url = %self.url, error = %e, "Disposal failed on drop");
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for ActivatedResult<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivatedResult")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("view", &self.view)
            .field("params", &self.params)
            .finish()
    }
}

/// Disposal failure for one slot.
#[derive(Debug)]
pub struct DisposalFailure {
    pub depth: usize,
    pub path: Path,
    pub error: BoxError,
}

/// Router-owned results, one per chain position.
pub struct Slots<V> {
    results: Vec<ActivatedResult<V>>,
}

impl<V> Default for Slots<V> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
        }
    }
}

impl<V> Slots<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn last(&self) -> Option<&ActivatedResult<V>> {
        self.results.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivatedResult<V>> {
        self.results.iter()
    }

    /// Dispose every result at depth `depth` and below, deepest first.
    ///
    /// Each disposal is attempted regardless of earlier failures.
    pub fn truncate_at(&mut self, depth: usize) -> Vec<DisposalFailure> {
        let mut failures = Vec::new();
        while self.results.len() > depth {
            let Some(result) = self.results.pop() else {
                break;
            };
            let index = self.results.len();
            let path = result.url.to_absolute();
            tracing::debug!(depth = index, path = %path, "Disposing view");
            if let Err(error) = result.dispose() {
                failures.push(DisposalFailure {
                    depth: index,
                    path,
                    error,
                });
            }
        }
        failures
    }

    /// Install `result` at `depth`, disposing whatever occupied that slot or
    /// any deeper one first.
    pub fn install(&mut self, depth: usize, result: ActivatedResult<V>) -> Vec<DisposalFailure> {
        let failures = self.truncate_at(depth);
        self.results.push(result);
        failures
    }
}
