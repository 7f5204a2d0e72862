//! Trailing-edge debouncing of change notifications.
//!
//! [`ChangeDebouncer`] is a clock-injected state machine: callers pass the
//! current [`Instant`] to [`notify`](ChangeDebouncer::notify) and
//! [`poll`](ChangeDebouncer::poll), which keeps it deterministic under test.
//! [`DebounceHandle`] drives one on the tokio runtime and invokes a callback
//! when the quiet interval elapses.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Quiet interval used when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// Coalesces a burst of change events into a single fire once inputs go quiet.
#[derive(Debug, Clone)]
pub struct ChangeDebouncer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl Default for ChangeDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl ChangeDebouncer {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record a change at `now`, restarting any pending timer.
    pub fn notify(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    /// Drop the pending fire, if any. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the pending fire is due.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` exactly once per burst, the first time `now` reaches
    /// the deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

enum Control {
    Notify,
    Cancel,
}

/// Handle to a debouncer running on the tokio runtime.
///
/// The callback runs on the driver task after each quiet interval. Dropping
/// the handle (or calling [`shutdown`](Self::shutdown)) stops the driver so
/// no stale callback fires afterwards.
pub struct DebounceHandle {
    tx: mpsc::UnboundedSender<Control>,
    task: JoinHandle<()>,
}

impl DebounceHandle {
    /// Spawn a driver task. Must be called from within a tokio runtime.
    pub fn spawn<F>(interval: Duration, mut on_fire: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(async move {
            let mut debouncer = ChangeDebouncer::new(interval);
            loop {
                let deadline = debouncer
                    .deadline()
                    .map_or_else(tokio::time::Instant::now, tokio::time::Instant::from_std);
                tokio::select! {
                    msg = rx.recv() => match msg {
                        Some(Control::Notify) => {
                            debouncer.notify(tokio::time::Instant::now().into_std());
                        }
                        Some(Control::Cancel) => {
                            debouncer.cancel();
                        }
                        None => break,
                    },
                    () = tokio::time::sleep_until(deadline), if debouncer.is_pending() => {
                        if debouncer.poll(tokio::time::Instant::now().into_std()) {
                            on_fire();
                        }
                    }
                }
            }
        });
        Self { tx, task }
    }

    /// Record a change; the callback fires once the interval passes quietly.
    pub fn notify(&self) {
        let _ = self.tx.send(Control::Notify);
    }

    /// Drop the pending fire without stopping the driver.
    pub fn cancel(&self) {
        let _ = self.tx.send(Control::Cancel);
    }

    /// Stop the driver, discarding any pending fire.
    pub fn shutdown(self) {
        self.task.abort();
    }
}

impl Drop for DebounceHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn burst_fires_once_after_last_notify() {
        let t0 = Instant::now();
        let mut debouncer = ChangeDebouncer::new(ms(100));

        debouncer.notify(t0);
        debouncer.notify(t0 + ms(30));
        debouncer.notify(t0 + ms(60));

        let fires: Vec<u64> = (0..=300)
            .filter(|&t| debouncer.poll(t0 + ms(t)))
            .collect();
        assert_eq!(fires, vec![160]);
    }

    #[test]
    fn no_fire_without_notify() {
        let t0 = Instant::now();
        let mut debouncer = ChangeDebouncer::default();
        assert_eq!(debouncer.interval(), DEFAULT_INTERVAL);
        assert!(!debouncer.poll(t0 + ms(1_000)));
    }

    #[test]
    fn no_leading_edge_fire() {
        let t0 = Instant::now();
        let mut debouncer = ChangeDebouncer::new(ms(100));
        debouncer.notify(t0);
        assert!(!debouncer.poll(t0));
        assert!(!debouncer.poll(t0 + ms(99)));
        assert!(debouncer.poll(t0 + ms(100)));
    }

    #[test]
    fn cancel_discards_pending_fire() {
        let t0 = Instant::now();
        let mut debouncer = ChangeDebouncer::new(ms(100));
        debouncer.notify(t0);
        assert!(debouncer.cancel());
        assert!(!debouncer.is_pending());
        assert!(!debouncer.poll(t0 + ms(500)));
        assert!(!debouncer.cancel());
    }

    #[test]
    fn separate_bursts_fire_separately() {
        let t0 = Instant::now();
        let mut debouncer = ChangeDebouncer::new(ms(100));
        debouncer.notify(t0);
        assert!(debouncer.poll(t0 + ms(100)));
        debouncer.notify(t0 + ms(200));
        assert_eq!(debouncer.deadline(), Some(t0 + ms(300)));
        assert!(debouncer.poll(t0 + ms(300)));
    }

    fn counting_handle(interval: Duration) -> (DebounceHandle, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let handle = DebounceHandle::spawn(interval, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (handle, fired)
    }

    #[tokio::test(start_paused = true)]
    async fn handle_coalesces_burst() {
        let (handle, fired) = counting_handle(ms(100));

        handle.notify();
        tokio::time::sleep(ms(30)).await;
        handle.notify();
        tokio::time::sleep(ms(30)).await;
        handle.notify();

        tokio::time::sleep(ms(99)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(ms(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        tokio::time::sleep(ms(500)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn handle_cancel_suppresses_fire() {
        let (handle, fired) = counting_handle(ms(100));

        handle.notify();
        tokio::time::sleep(ms(50)).await;
        handle.cancel();
        tokio::time::sleep(ms(500)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        handle.notify();
        tokio::time::sleep(ms(150)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_prevents_stale_fire() {
        let (handle, fired) = counting_handle(ms(100));

        handle.notify();
        tokio::time::sleep(ms(10)).await;
        handle.shutdown();
        tokio::time::sleep(ms(500)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
