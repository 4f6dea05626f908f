//! Structured error reporting service
//!
//! Captures error incidents, infers severity and category from the message
//! and caller context, buffers reports in a bounded queue, and ships them in
//! batches. Reports of `critical` severity escalate: enqueueing one signals
//! the flush worker immediately instead of waiting for the next timer tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use beacon_domain::{
    ContextMap, ContextValue, Environment, ErrorBatch, ErrorReport, ErrorStats, ReportFilter,
    ReporterConfig, Result, Severity, TelemetryError,
};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tokio::sync::Notify;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::classify;
use crate::ports::{EnvironmentProbe, ErrorTransport, ReportSink};
use crate::queue::BoundedQueue;
use crate::scheduler::{FlushOutcome, FlushTarget};

/// Longest response-body excerpt recorded in report context
const MAX_BODY_EXCERPT: usize = 256;

/// Probe used until an adapter is attached; reports carry an empty agent
struct NullEnvironment;

impl EnvironmentProbe for NullEnvironment {
    fn capture(&self) -> Environment {
        Environment::default()
    }
}

/// Structured error reporter with bounded buffering and batched delivery
pub struct ErrorReporter {
    config: ReporterConfig,
    session_id: Option<String>,
    user_id: RwLock<Option<String>>,
    environment: Arc<dyn EnvironmentProbe>,
    queue: Mutex<BoundedQueue<ErrorReport>>,
    sinks: RwLock<Vec<Arc<dyn ReportSink>>>,
    transport: Option<Arc<dyn ErrorTransport>>,
    escalation: Arc<Notify>,
    flush_in_flight: AtomicBool,
}

impl ErrorReporter {
    /// Create a reporter with the given configuration and no transport
    pub fn new(config: ReporterConfig) -> Result<Self> {
        config.validate().map_err(TelemetryError::Config)?;

        let session_id =
            config.enable_session_tracking.then(|| Uuid::new_v4().to_string());

        Ok(Self {
            queue: Mutex::new(BoundedQueue::new(config.max_stored_errors)),
            session_id,
            config,
            user_id: RwLock::new(None),
            environment: Arc::new(NullEnvironment),
            sinks: RwLock::new(Vec::new()),
            transport: None,
            escalation: Arc::new(Notify::new()),
            flush_in_flight: AtomicBool::new(false),
        })
    }

    /// Attach the remote transport
    pub fn with_transport(mut self, transport: Arc<dyn ErrorTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Attach the environment probe
    pub fn with_environment(mut self, environment: Arc<dyn EnvironmentProbe>) -> Self {
        self.environment = environment;
        self
    }

    /// Register an observer for accepted reports
    pub fn register_sink(&self, sink: Arc<dyn ReportSink>) {
        self.sinks.write().push(sink);
    }

    /// The process-lifetime session identifier, if session tracking is on
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Set or clear the user identifier stamped on subsequent reports
    pub fn set_user_id(&self, user_id: Option<String>) {
        *self.user_id.write() = user_id;
    }

    /// Signal the flush worker listens on for critical escalation
    pub fn escalation_signal(&self) -> Arc<Notify> {
        Arc::clone(&self.escalation)
    }

    /// Capture an error incident
    ///
    /// Severity and category are inferred from the message and context.
    /// Returns the report identifier. Never blocks and never fails.
    pub fn report_error(
        &self,
        message: impl Into<String>,
        context: Option<ContextMap>,
        component_stack: Option<&str>,
        retry_count: Option<u32>,
    ) -> String {
        let message = message.into();
        let (severity, category) =
            classify::classify(&message, context.as_ref(), component_stack.is_some());

        let mut report =
            ErrorReport::new(message, severity, category, self.environment.capture());
        if let Some(context) = context {
            report = report.with_context(context);
        }
        if let Some(component_stack) = component_stack {
            report = report.with_component_stack(component_stack);
        }
        if let Some(retry_count) = retry_count {
            report = report.with_retry_count(retry_count);
        }

        self.submit(report)
    }

    /// Capture a caught error value, recording its source chain
    pub fn report_caught(
        &self,
        error: &(dyn std::error::Error + 'static),
        context: Option<ContextMap>,
    ) -> String {
        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push(format!("caused by: {cause}"));
            source = cause.source();
        }

        let message = error.to_string();
        let (severity, category) = classify::classify(&message, context.as_ref(), false);

        let mut report =
            ErrorReport::new(message, severity, category, self.environment.capture());
        if !chain.is_empty() {
            report = report.with_stack_trace(chain.join("\n"));
        }
        if let Some(context) = context {
            report = report.with_context(context);
        }

        self.submit(report)
    }

    /// Capture a failed network request
    pub fn report_network_error(
        &self,
        url: &str,
        method: &str,
        status: Option<u16>,
        response_body: Option<&str>,
        context: Option<ContextMap>,
    ) -> String {
        let message = match status {
            Some(status) => format!("Network request failed: {method} {url} ({status})"),
            None => format!("Network request failed: {method} {url}"),
        };

        let mut context = context.unwrap_or_default();
        context.insert("url".to_string(), ContextValue::from(url));
        context.insert("method".to_string(), ContextValue::from(method));
        if let Some(status) = status {
            context.insert("status".to_string(), ContextValue::from(status));
        }
        if let Some(body) = response_body {
            context.insert("responseBody".to_string(), ContextValue::from(excerpt(body)));
        }

        self.report_error(message, Some(context), None, None)
    }

    /// Capture a failed API call
    pub fn report_api_error(
        &self,
        endpoint: &str,
        method: &str,
        status: u16,
        response_data: Option<&str>,
        context: Option<ContextMap>,
    ) -> String {
        let message = format!("API error: {method} {endpoint} ({status})");

        let mut context = context.unwrap_or_default();
        context.insert("endpoint".to_string(), ContextValue::from(endpoint));
        context.insert("method".to_string(), ContextValue::from(method));
        context.insert("status".to_string(), ContextValue::from(status));
        if let Some(data) = response_data {
            context.insert("responseData".to_string(), ContextValue::from(excerpt(data)));
        }

        self.report_error(message, Some(context), None, None)
    }

    /// Mark a queued report as handled
    ///
    /// Returns whether a report with that identifier was found. Idempotent:
    /// a repeat call changes nothing and alters neither queue length nor
    /// order.
    pub fn mark_resolved(&self, id: &str, resolution: Option<&str>) -> bool {
        let mut queue = self.queue.lock();
        match queue.find_mut(|report| report.id == id) {
            Some(report) => {
                report.mark_resolved(resolution.map(str::to_string));
                true
            }
            None => {
                debug!(id, "mark_resolved: report not queued (already delivered or evicted)");
                false
            }
        }
    }

    /// Number of currently queued reports
    pub fn queued(&self) -> usize {
        self.queue.lock().len()
    }

    /// Aggregate statistics over the queued reports, one full pass
    pub fn stats(&self) -> ErrorStats {
        let queue = self.queue.lock();
        let mut stats = ErrorStats { total: queue.len(), ..Default::default() };
        for report in queue.iter() {
            *stats.by_severity.entry(report.severity).or_insert(0) += 1;
            *stats.by_category.entry(report.category).or_insert(0) += 1;
            if !report.resolved {
                stats.unresolved += 1;
            }
        }
        stats
    }

    /// Defensive copy of the queued reports, optionally filtered
    pub fn snapshot(&self, filter: Option<&ReportFilter>) -> Vec<ErrorReport> {
        let queue = self.queue.lock();
        match filter {
            None => queue.snapshot(),
            Some(filter) => queue
                .iter()
                .filter(|report| {
                    filter.severity.map_or(true, |s| report.severity == s)
                        && filter.category.map_or(true, |c| report.category == c)
                        && (!filter.unresolved_only || !report.resolved)
                })
                .cloned()
                .collect(),
        }
    }

    /// Attempt one delivery of up to `batch_size` queued reports
    ///
    /// Same contract as the logger flush: disabled remote is a no-op,
    /// failure requeues at the head and is never surfaced.
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

    /// Capture a pre-built report with explicit severity and category
    ///
    /// Bypasses keyword inference; session and user stamps are still
    /// applied. This is the path global hooks use to file `critical`
    /// reports.
    pub fn report(&self, report: ErrorReport) -> String {
        self.submit(report)
    }

    fn submit(&self, mut report: ErrorReport) -> String {
        if let Some(session_id) = &self.session_id {
            report = report.with_session_id(session_id.clone());
        }
        if self.config.enable_user_tracking {
            if let Some(user_id) = self.user_id.read().as_ref() {
                report = report.with_user_id(user_id.clone());
            }
        }

        let severity = report.severity;
        let id = report.id.clone();

        for sink in self.sinks.read().iter() {
            sink.on_report(&report);
        }

        let evicted = self.queue.lock().push(report);
        if evicted.is_some() {
            debug!(
                capacity = self.config.max_stored_errors,
                "error queue full; dropped oldest report"
            );
        }

        if severity == Severity::Critical {
            debug!(id, "critical report captured; escalating flush");
            self.escalation.notify_one();
        }

        id
    }

    fn active_transport(&self) -> Option<&Arc<dyn ErrorTransport>> {
        if !self.config.enable_remote_reporting || self.config.remote_endpoint.is_none() {
            return None;
        }
        self.transport.as_ref()
    }

    async fn flush_batch(&self, transport: &dyn ErrorTransport) -> FlushOutcome {
        let errors = self.queue.lock().take_batch(self.config.batch_size);
        if errors.is_empty() {
            return FlushOutcome::Empty;
        }

        let batch = ErrorBatch {
            errors,
            session_id: self.session_id.clone(),
            timestamp: Utc::now(),
        };

        match transport.deliver(&batch).await {
            Ok(()) => {
                debug!(count = batch.errors.len(), "error batch delivered");
                FlushOutcome::Delivered(batch.errors.len())
            }
            Err(e) => {
                warn!(
                    count = batch.errors.len(),
                    error = %e,
                    "error delivery failed; requeueing batch"
                );
                let count = batch.errors.len();
                let dropped = self.queue.lock().requeue_front(batch.errors);
                if dropped > 0 {
                    debug!(dropped, "requeue overflowed capacity; dropped oldest reports");
                }
                FlushOutcome::Requeued(count - dropped)
            }
        }
    }
}

#[async_trait]
impl FlushTarget for ErrorReporter {
    async fn flush(&self) -> FlushOutcome {
        self.force_flush().await
    }

    fn name(&self) -> &'static str {
        "reporter"
    }
}

fn excerpt(body: &str) -> String {
    if body.len() <= MAX_BODY_EXCERPT {
        return body.to_string();
    }

    let mut truncated: String =
        body.chars().take(MAX_BODY_EXCERPT.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}
