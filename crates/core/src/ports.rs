//! Port interfaces for the telemetry pipeline

use async_trait::async_trait;
use beacon_domain::{Environment, ErrorBatch, ErrorReport, LogBatch, LogEvent, Result};

/// Trait for delivering log batches to a remote collector
#[async_trait]
pub trait LogTransport: Send + Sync {
    /// Deliver one batch; any error means the whole batch failed
    async fn deliver(&self, batch: &LogBatch) -> Result<()>;
}

/// Trait for delivering error-report batches to a remote collector
#[async_trait]
pub trait ErrorTransport: Send + Sync {
    /// Deliver one batch; any error means the whole batch failed
    async fn deliver(&self, batch: &ErrorBatch) -> Result<()>;
}

/// Observer for accepted log events
///
/// Sinks run synchronously on the capture path, after level filtering and
/// before the event enters the queue; implementations must not block.
pub trait LogSink: Send + Sync {
    fn on_event(&self, event: &LogEvent);
}

/// Observer for accepted error reports
pub trait ReportSink: Send + Sync {
    fn on_report(&self, report: &ErrorReport);
}

/// Trait for capturing the host environment attached to error reports
pub trait EnvironmentProbe: Send + Sync {
    /// Snapshot the current environment (user agent, location)
    fn capture(&self) -> Environment;
}
