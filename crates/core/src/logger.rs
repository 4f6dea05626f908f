//! Structured leveled logging service
//!
//! Captures log events, filters them against the configured minimum level,
//! fans accepted events out to registered sinks, and buffers them in a
//! bounded queue for batched delivery. Capture is synchronous and never
//! blocks; the only suspension point is the network call inside a flush.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use beacon_domain::{
    LogBatch, LogEvent, LogFilter, LogLevel, LogStats, LoggerConfig, Result, TelemetryError,
};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::ports::{LogSink, LogTransport};
use crate::queue::BoundedQueue;
use crate::scheduler::{FlushOutcome, FlushTarget};

/// Structured leveled logger with bounded buffering and batched delivery
pub struct EventLogger {
    config: LoggerConfig,
    session_id: Option<String>,
    queue: Mutex<BoundedQueue<LogEvent>>,
    sinks: RwLock<Vec<Arc<dyn LogSink>>>,
    transport: Option<Arc<dyn LogTransport>>,
    flush_in_flight: AtomicBool,
}

impl EventLogger {
    /// Create a logger with the given configuration and no transport
    pub fn new(config: LoggerConfig) -> Result<Self> {
        config.validate().map_err(TelemetryError::Config)?;

        let session_id =
            config.enable_session_tracking.then(|| Uuid::new_v4().to_string());

        Ok(Self {
            queue: Mutex::new(BoundedQueue::new(config.max_stored_logs)),
            session_id,
            config,
            sinks: RwLock::new(Vec::new()),
            transport: None,
            flush_in_flight: AtomicBool::new(false),
        })
    }

    /// Attach the remote transport
    pub fn with_transport(mut self, transport: Arc<dyn LogTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Register an observer for accepted events
    pub fn register_sink(&self, sink: Arc<dyn LogSink>) {
        self.sinks.write().push(sink);
    }

    /// The process-lifetime session identifier, if session tracking is on
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Capture one log event
    ///
    /// Events below the configured minimum level are discarded before they
    /// reach the queue. Never blocks and never fails.
    pub fn log(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        context: Option<beacon_domain::ContextMap>,
        component: Option<&str>,
    ) {
        if level < self.config.min_level {
            return;
        }

        let mut event = LogEvent::new(level, message);
        if let Some(context) = context {
            event = event.with_context(context);
        }
        if let Some(component) = component {
            event = event.with_component(component);
        }
        if let Some(session_id) = &self.session_id {
            event = event.with_session_id(session_id.clone());
        }

        for sink in self.sinks.read().iter() {
            sink.on_event(&event);
        }

        let evicted = self.queue.lock().push(event);
        if evicted.is_some() {
            debug!(capacity = self.config.max_stored_logs, "log queue full; dropped oldest entry");
        }
    }

    /// Capture a `debug` event
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message, None, None);
    }

    /// Capture an `info` event
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message, None, None);
    }

    /// Capture a `warn` event
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message, None, None);
    }

    /// Capture an `error` event
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message, None, None);
    }

    /// Number of currently queued events
    pub fn queued(&self) -> usize {
        self.queue.lock().len()
    }

    /// Aggregate statistics over the queued events
    ///
    /// Computed by one full pass, so they are always consistent with the
    /// snapshot taken at the same moment.
    pub fn stats(&self) -> LogStats {
        let queue = self.queue.lock();
        let mut stats = LogStats { total: queue.len(), ..Default::default() };
        for event in queue.iter() {
            *stats.by_level.entry(event.level).or_insert(0) += 1;
        }
        stats
    }

    /// Defensive copy of the queued events, optionally filtered
    pub fn snapshot(&self, filter: Option<&LogFilter>) -> Vec<LogEvent> {
        let queue = self.queue.lock();
        match filter {
            None => queue.snapshot(),
            Some(filter) => queue
                .iter()
                .filter(|event| {
                    filter.min_level.map_or(true, |min| event.level >= min)
                        && filter
                            .component
                            .as_deref()
                            .map_or(true, |c| event.component.as_deref() == Some(c))
                })
                .cloned()
                .collect(),
        }
    }

    /// Attempt one delivery of up to `batch_size` queued events
    ///
    /// With remote logging disabled or no endpoint configured this is a
    /// no-op and the queue is left untouched. Delivery failure requeues the
    /// batch at the head and is never surfaced to the caller.
    pub async fn force_flush(&self) -> FlushOutcome {
        let Some(transport) = self.active_transport() else {
            return FlushOutcome::Disabled;
        };

        if self
            .flush_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return FlushOutcome::InFlight;
        }

        let outcome = self.flush_batch(transport.as_ref()).await;
        self.flush_in_flight.store(false, Ordering::SeqCst);
        outcome
    }

    fn active_transport(&self) -> Option<&Arc<dyn LogTransport>> {
        if !self.config.enable_remote_logging || self.config.remote_endpoint.is_none() {
            return None;
        }
        self.transport.as_ref()
    }

    async fn flush_batch(&self, transport: &dyn LogTransport) -> FlushOutcome {
        let events = self.queue.lock().take_batch(self.config.batch_size);
        if events.is_empty() {
            return FlushOutcome::Empty;
        }

        let batch = LogBatch {
            events,
            session_id: self.session_id.clone(),
            timestamp: Utc::now(),
        };

        match transport.deliver(&batch).await {
            Ok(()) => {
                debug!(count = batch.events.len(), "log batch delivered");
                FlushOutcome::Delivered(batch.events.len())
            }
            Err(e) => {
                warn!(count = batch.events.len(), error = %e, "log delivery failed; requeueing batch");
                let count = batch.events.len();
                let dropped = self.queue.lock().requeue_front(batch.events);
                if dropped > 0 {
                    debug!(dropped, "requeue overflowed capacity; dropped oldest entries");
                }
                FlushOutcome::Requeued(count - dropped)
            }
        }
    }
}

#[async_trait]
impl FlushTarget for EventLogger {
    async fn flush(&self) -> FlushOutcome {
        self.force_flush().await
    }

    fn name(&self) -> &'static str {
        "logger"
    }
}
