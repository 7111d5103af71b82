// Bus shutdown token

use std::time::Duration;
use tokio::sync::watch;

/// Outcome of an interruptible nap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nap {
    Elapsed,
    Interrupted,
}

/// Shutdown signal observed by every worker of one bus start
#[derive(Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    /// Check if shutdown was requested
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for shutdown signal
    pub async fn wait(&mut self) {
        // A dropped sender also ends the wait
        let _ = self.rx.wait_for(|stop| *stop).await;
    }

    /// Sleep for `duration` unless shutdown arrives first
    pub async fn nap(&mut self, duration: Duration) -> Nap {
        if self.is_shutdown() {
            return Nap::Interrupted;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => Nap::Elapsed,
            _ = self.wait() => Nap::Interrupted,
        }
    }
}

/// Shutdown sender
pub struct ShutdownSender {
    tx: watch::Sender<bool>,
}

impl ShutdownSender {
    /// Signal shutdown to all workers
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

/// Create a shutdown channel
pub fn shutdown_channel() -> (ShutdownSender, ShutdownToken) {
    let (tx, rx) = watch::channel(false);
    (ShutdownSender { tx }, ShutdownToken { rx })
}
