//! Teardown signal between a subscription handle and its driver task.

use tokio::sync::broadcast;

/// Handle side of the signal. The driver keeps the receiver returned by
/// [`Shutdown::pair`] for as long as it runs.
pub(crate) struct Shutdown {
    tx: broadcast::Sender<()>,
    fired: bool,
}

impl Shutdown {
    pub(crate) fn pair() -> (Self, broadcast::Receiver<()>) {
        let (tx, rx) = broadcast::channel(1);
        (Self { tx, fired: false }, rx)
    }

    /// Ask the driver to dispose everything and stop. Only the first call
    /// sends. Returns true if that call reached a running driver.
    pub(crate) fn trigger(&mut self) -> bool {
        if std::mem::replace(&mut self.fired, true) {
            return false;
        }
        self.tx.send(()).is_ok()
    }
}
