//! Flush scheduling for the telemetry services
//!
//! A [`FlushWorker`] owns the recurring timer of one subsystem instance:
//! it sleeps `interval`, invokes [`FlushTarget::flush`], and repeats until
//! cancelled. A worker can also carry a wakeup signal so the owning service
//! can force an out-of-band flush (critical escalation) without waiting for
//! the next tick. Teardown cancels the timer; queued events are retained in
//! memory and no final flush is attempted.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use beacon_domain::{Result, TelemetryError};
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Result of one flush attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Batch acknowledged by the collector; count of delivered elements
    Delivered(usize),
    /// Nothing was queued
    Empty,
    /// Remote delivery disabled or no endpoint configured; queue untouched
    Disabled,
    /// Another flush of the same instance is already in flight
    InFlight,
    /// Delivery failed; the batch was reinserted at the head of the queue
    Requeued(usize),
}

/// A service the scheduler can flush
#[async_trait]
pub trait FlushTarget: Send + Sync {
    /// Attempt one flush
    ///
    /// Delivery failures are absorbed by the target (requeue + local log),
    /// never surfaced to the trigger.
    async fn flush(&self) -> FlushOutcome;

    /// Short name used in worker traces
    fn name(&self) -> &'static str;
}

/// Configuration for the flush worker
#[derive(Debug, Clone)]
pub struct FlushWorkerConfig {
    /// Interval between periodic flushes; zero disables the timer
    pub interval: Duration,
    /// Join timeout when stopping
    pub join_timeout: Duration,
}

impl Default for FlushWorkerConfig {
    fn default() -> Self {
        Self { interval: Duration::from_secs(30), join_timeout: Duration::from_secs(5) }
    }
}

/// Flush worker with explicit lifecycle management
pub struct FlushWorker {
    target: Arc<dyn FlushTarget>,
    config: FlushWorkerConfig,
    wakeup: Option<Arc<Notify>>,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl FlushWorker {
    /// Create a worker for the given target
    pub fn new(target: Arc<dyn FlushTarget>, config: FlushWorkerConfig) -> Self {
        Self {
            target,
            config,
            wakeup: None,
            cancellation: CancellationToken::new(),
            task_handle: None,
        }
    }

    /// Attach an out-of-band wakeup signal (critical escalation)
    pub fn with_wakeup(mut self, wakeup: Arc<Notify>) -> Self {
        self.wakeup = Some(wakeup);
        self
    }

    /// Start the worker, spawning the background flush loop
    ///
    /// With a zero interval and no wakeup signal there is nothing to drive,
    /// so the worker stays stopped.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Err(TelemetryError::Internal("flush worker already running".to_string()));
        }

        let interval =
            if self.config.interval.is_zero() { None } else { Some(self.config.interval) };

        if interval.is_none() && self.wakeup.is_none() {
            debug!(subsystem = self.target.name(), "periodic flush disabled; worker not started");
            return Ok(());
        }

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!(
                    subsystem = self.target.name(),
                    "skipping flush worker start: no active Tokio runtime detected"
                );
                return Ok(());
            }
        };

        self.cancellation = CancellationToken::new();

        let target = Arc::clone(&self.target);
        let wakeup = self.wakeup.clone();
        let cancel = self.cancellation.clone();

        let handle = runtime.spawn(async move {
            Self::flush_loop(target, interval, wakeup, cancel).await;
        });

        self.task_handle = Some(handle);
        info!(subsystem = self.target.name(), "flush worker started");

        Ok(())
    }

    /// Stop the worker and wait for the flush loop to finish
    ///
    /// Queued events are retained; no final flush is performed.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.task_handle.take() else {
            return Ok(());
        };

        self.cancellation.cancel();

        match tokio::time::timeout(self.config.join_timeout, handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(subsystem = self.target.name(), error = %e, "flush loop panicked");
                return Err(TelemetryError::Internal("flush loop panicked".to_string()));
            }
            Err(_) => {
                warn!(subsystem = self.target.name(), "flush loop did not stop within timeout");
                return Err(TelemetryError::Internal("flush loop join timeout".to_string()));
            }
        }

        info!(subsystem = self.target.name(), "flush worker stopped");
        Ok(())
    }

    /// Returns true while the flush loop is spawned
    pub fn is_running(&self) -> bool {
        self.task_handle.is_some()
    }

    async fn flush_loop(
        target: Arc<dyn FlushTarget>,
        interval: Option<Duration>,
        wakeup: Option<Arc<Notify>>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(subsystem = target.name(), "flush loop cancelled");
                    break;
                }
                _ = sleep_or_pending(interval) => {
                    let outcome = target.flush().await;
                    debug!(subsystem = target.name(), ?outcome, "periodic flush");
                }
                _ = notified_or_pending(wakeup.as_deref()) => {
                    let outcome = target.flush().await;
                    debug!(subsystem = target.name(), ?outcome, "escalated flush");
                }
            }
        }
    }
}

async fn sleep_or_pending(interval: Option<Duration>) {
    match interval {
        Some(duration) => tokio::time::sleep(duration).await,
        None => std::future::pending().await,
    }
}

async fn notified_or_pending(wakeup: Option<&Notify>) {
    match wakeup {
        Some(notify) => notify.notified().await,
        None => std::future::pending().await,
    }
}

impl Drop for FlushWorker {
    fn drop(&mut self) {
        if self.is_running() {
            warn!(subsystem = self.target.name(), "flush worker dropped while running; cancelling");
            self.cancellation.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingTarget {
        flushes: AtomicUsize,
    }

    impl CountingTarget {
        fn new() -> Arc<Self> {
            Arc::new(Self { flushes: AtomicUsize::new(0) })
        }

        fn count(&self) -> usize {
            self.flushes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FlushTarget for CountingTarget {
        async fn flush(&self) -> FlushOutcome {
            self.flushes.fetch_add(1, Ordering::SeqCst);
            FlushOutcome::Empty
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test]
    async fn periodic_flushes_fire_until_stopped() {
        let target = CountingTarget::new();
        let mut worker = FlushWorker::new(
            target.clone(),
            FlushWorkerConfig { interval: Duration::from_millis(10), ..Default::default() },
        );

        worker.start().unwrap();
        tokio::time::sleep(Duration::from_millis(65)).await;
        worker.stop().await.unwrap();

        let after_stop = target.count();
        assert!(after_stop >= 2, "expected at least two ticks, got {after_stop}");

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(target.count(), after_stop, "flushes continued after stop");
    }

    #[tokio::test]
    async fn zero_interval_without_wakeup_never_starts() {
        let target = CountingTarget::new();
        let mut worker = FlushWorker::new(
            target.clone(),
            FlushWorkerConfig { interval: Duration::ZERO, ..Default::default() },
        );

        worker.start().unwrap();
        assert!(!worker.is_running());

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(target.count(), 0);
    }

    #[tokio::test]
    async fn wakeup_triggers_flush_without_timer() {
        let target = CountingTarget::new();
        let wakeup = Arc::new(Notify::new());
        let mut worker = FlushWorker::new(
            target.clone(),
            FlushWorkerConfig { interval: Duration::ZERO, ..Default::default() },
        )
        .with_wakeup(wakeup.clone());

        worker.start().unwrap();
        assert!(worker.is_running());

        wakeup.notify_one();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(target.count(), 1);

        worker.stop().await.unwrap();
    }

    #[tokio::test]
    async fn double_start_is_rejected() {
        let target = CountingTarget::new();
        let mut worker = FlushWorker::new(
            target.clone(),
            FlushWorkerConfig { interval: Duration::from_millis(50), ..Default::default() },
        );

        worker.start().unwrap();
        assert!(worker.start().is_err());
        worker.stop().await.unwrap();
    }
}
