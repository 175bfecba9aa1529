//! Passive path sources.
//!
//! A source observes some external notion of "current location" and yields
//! it as a stream of paths. The router merges every source with its own
//! navigator; base-path stripping and duplicate suppression happen in the
//! router, not here.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};

use crate::routing::Path;

/// A passive navigation source.
pub trait PathSource: Send + Sync {
    /// Stream of observed paths. Called once per router subscription.
    fn paths(&self) -> BoxStream<'static, Path>;
}

/// Polls a location getter at a fixed interval and yields each change.
pub struct PollingSource<F> {
    read: Arc<F>,
    period: Duration,
}

impl<F> PollingSource<F>
where
    F: Fn() -> String + Send + Sync + 'static,
{
    pub fn new(read: F, period: Duration) -> Self {
        Self {
            read: Arc::new(read),
            period,
        }
    }
}

impl<F> PathSource for PollingSource<F>
where
    F: Fn() -> String + Send + Sync + 'static,
{
    fn paths(&self) -> BoxStream<'static, Path> {
        let read = self.read.clone();
        let period = self.period;
        stream::unfold(
            (None::<tokio::time::Interval>, None::<String>),
            move |(ticker, last)| {
                let read = read.clone();
                async move {
                    let mut ticker = match ticker {
                        Some(ticker) => ticker,
                        None => {
                            let mut ticker = interval(period);
                            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                            ticker
                        }
                    };
                    loop {
                        ticker.tick().await;
                        let current = read();
                        if last.as_deref() != Some(current.as_str()) {
                            let path = Path::parse(&current);
                            return Some((path, (Some(ticker), Some(current))));
                        }
                    }
                }
            },
        )
        .boxed()
    }
}

/// Paths pushed through an unbounded channel.
///
/// The receiving half can only be streamed once; later calls to
/// [`PathSource::paths`] yield an empty stream.
pub struct ChannelSource {
    rx: Mutex<Option<mpsc::UnboundedReceiver<Path>>>,
}

impl ChannelSource {
    pub fn new() -> (mpsc::UnboundedSender<Path>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            tx,
            Self {
                rx: Mutex::new(Some(rx)),
            },
        )
    }
}

impl PathSource for ChannelSource {
    fn paths(&self) -> BoxStream<'static, Path> {
        let rx = match self.rx.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match rx {
            Some(rx) => stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|path| (path, rx))
            })
            .boxed(),
            None => {
                tracing::warn!("Channel source already consumed");
                stream::empty().boxed()
            }
        }
    }
}

/// The unmatched remainder of a parent router, for nesting a child router
/// under an outlet.
///
/// Yields the parent's current remainder first, then every later one. A
/// parent that has not committed a navigation yet has no remainder, so the
/// child stays idle until it does.
pub struct RemainderSource {
    rx: watch::Receiver<Option<Path>>,
}

impl RemainderSource {
    pub(crate) fn new(rx: watch::Receiver<Option<Path>>) -> Self {
        Self { rx }
    }
}

impl PathSource for RemainderSource {
    fn paths(&self) -> BoxStream<'static, Path> {
        let mut rx = self.rx.clone();
        rx.mark_changed();
        stream::unfold(rx, |mut rx| async move {
            loop {
                rx.changed().await.ok()?;
                let next = rx.borrow_and_update().clone();
                if let Some(path) = next {
                    return Some((path, rx));
                }
            }
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_polling_source_yields_changes_only() {
        let reads = Arc::new(AtomicUsize::new(0));
        let counter = reads.clone();
        let source = PollingSource::new(
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n < 3 { "/a".to_string() } else { "/b".to_string() }
            },
            Duration::from_millis(1),
        );

        let paths: Vec<Path> = source.paths().take(2).collect().await;
        assert_eq!(paths, vec![Path::from(["a"]), Path::from(["b"])]);
        assert!(reads.load(Ordering::SeqCst) >= 4);
    }

    #[tokio::test]
    async fn test_channel_source_streams_once() {
        let (tx, source) = ChannelSource::new();
        tx.send(Path::from(["x"])).unwrap();
        drop(tx);

        let paths: Vec<Path> = source.paths().collect().await;
        assert_eq!(paths, vec![Path::from(["x"])]);
        assert!(source.paths().next().await.is_none());
    }

    #[tokio::test]
    async fn test_remainder_source_starts_with_current() {
        let (tx, rx) = watch::channel(Some(Path::from(["a"])));
        let source = RemainderSource::new(rx);
        let mut paths = source.paths();
        assert_eq!(paths.next().await, Some(Path::from(["a"])));

        tx.send(Some(Path::from(["b"]))).unwrap();
        assert_eq!(paths.next().await, Some(Path::from(["b"])));

        drop(tx);
        assert_eq!(paths.next().await, None);
    }

    #[tokio::test]
    async fn test_remainder_source_waits_for_first_commit() {
        let (tx, rx) = watch::channel(None);
        let source = RemainderSource::new(rx);
        let mut paths = source.paths();
        assert!(paths.next().now_or_never().is_none());

        tx.send(Some(Path::root())).unwrap();
        assert_eq!(paths.next().await, Some(Path::root()));
    }
}
