//! Shared utilities for router integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nested_router::error::{FailureContext, RouterError};
use nested_router::router::{on_dispose, try_on_dispose, ViewResult};
use nested_router::routing::{
    resolver_fn, Path, RouteDescriptor, RouteInput, Resolved, ResolverInput, ViewResolver,
};
use nested_router::UrlHelper;
use tokio::sync::Notify;

pub type View = &'static str;

/// Route shorthand: `route("a", "V1", vec![...])`.
pub fn route(template: &str, view: View, children: Vec<RouteInput<View>>) -> RouteInput<View> {
    RouteDescriptor::parse(template)
        .unwrap()
        .view(view)
        .routes(children)
        .into()
}

/// `a(V1) → b(V2)`: the tree used by the basic navigation scenarios.
pub fn scenario_routes() -> Vec<RouteInput<View>> {
    vec![route("a", "V1", vec![route("b", "V2", vec![])])]
}

#[derive(Default)]
struct Log {
    /// Serial → label, in activation order.
    activated: Vec<String>,
    /// Serials, in disposal order.
    disposed: Vec<usize>,
}

/// Executor that records every activation and disposal.
#[derive(Clone, Default)]
pub struct Recorder {
    log: Arc<Mutex<Log>>,
    failing_disposals: Arc<Mutex<Vec<&'static str>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disposals of `view` will report an error (after recording).
    pub fn fail_disposal_of(&self, view: &'static str) {
        self.failing_disposals.lock().unwrap().push(view);
    }

    pub fn executor(
        &self,
    ) -> impl Fn(&Resolved<View>, &UrlHelper) -> ViewResult + Send + Sync + 'static {
        let log = self.log.clone();
        let failing = self.failing_disposals.clone();
        move |resolved, url| {
            let view = resolved.view.unwrap_or("-");
            let serial = {
                let mut log = log.lock().unwrap();
                log.activated.push(format!("{}@{}", view, url.to_absolute()));
                log.activated.len() - 1
            };
            let log = log.clone();
            if failing.lock().unwrap().contains(&view) {
                Ok(try_on_dispose(move || {
                    log.lock().unwrap().disposed.push(serial);
                    Err(format!("{} refused to go", view).into())
                }))
            } else {
                Ok(on_dispose(move || log.lock().unwrap().disposed.push(serial)))
            }
        }
    }

    /// Labels (`view@/abs/path`) of every activation, in order.
    pub fn activated(&self) -> Vec<String> {
        self.log.lock().unwrap().activated.clone()
    }

    /// Labels of every disposal, in order.
    pub fn disposed(&self) -> Vec<String> {
        let log = self.log.lock().unwrap();
        log.disposed
            .iter()
            .map(|serial| log.activated[*serial].clone())
            .collect()
    }

    /// Activations not yet disposed.
    pub fn live(&self) -> usize {
        let log = self.log.lock().unwrap();
        log.activated.len() - log.disposed.len()
    }

    /// Every activation disposed, none twice.
    pub fn assert_all_disposed_once(&self) {
        let log = self.log.lock().unwrap();
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for serial in &log.disposed {
            *counts.entry(*serial).or_default() += 1;
        }
        for (serial, label) in log.activated.iter().enumerate() {
            assert_eq!(counts.get(&serial), Some(&1), "{} disposal count", label);
        }
    }
}

/// Error handler that keeps what it was given.
#[derive(Clone, Default)]
pub struct ErrorLog {
    entries: Arc<Mutex<Vec<(String, String, FailureContext)>>>,
}

impl ErrorLog {
    pub fn handler(&self) -> impl Fn(&RouterError, &FailureContext) + Send + Sync + 'static {
        let entries = self.entries.clone();
        move |error, context| {
            entries
                .lock()
                .unwrap()
                .push((error.kind().to_string(), error.to_string(), context.clone()));
        }
    }

    /// `(kind, message, context)` per reported failure.
    pub fn entries(&self) -> Vec<(String, String, FailureContext)> {
        self.entries.lock().unwrap().clone()
    }
}

/// A root resolver that holds any path starting with `slow` until released.
pub struct Gate {
    release: Arc<Notify>,
    entered: Arc<AtomicUsize>,
}

impl Gate {
    pub fn new() -> Self {
        Self {
            release: Arc::new(Notify::new()),
            entered: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn resolver(&self, routes: Vec<RouteInput<View>>) -> ViewResolver<View> {
        let inner = ResolverInput::Routes(routes).into_resolver();
        let release = self.release.clone();
        let entered = self.entered.clone();
        resolver_fn(move |path: Path| {
            let inner = inner.clone();
            let release = release.clone();
            let entered = entered.clone();
            async move {
                if path.segments().first().map(String::as_str) == Some("slow") {
                    entered.fetch_add(1, Ordering::SeqCst);
                    release.notified().await;
                }
                inner.resolve(path).await
            }
        })
    }

    /// Wait until a held resolution is in flight.
    pub async fn wait_entered(&self, count: usize) {
        for _ in 0..500 {
            if self.entered.load(Ordering::SeqCst) >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("gated resolver never entered");
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

/// Let the driver task run until it goes idle.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(5)).await;
}
