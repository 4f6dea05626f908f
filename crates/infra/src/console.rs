//! Console mirroring sinks
//!
//! Registered observers that echo accepted events and reports to the local
//! console through `tracing`. Mirroring is an opt-in sink, not an
//! interception of anyone's output; disabling console logging simply means
//! not registering these.

use beacon_core::ports::{LogSink, ReportSink};
use beacon_domain::{ErrorReport, LogEvent, LogLevel, Severity};
use tracing::{debug, error, info, warn};

/// Mirrors accepted log events to the local console
pub struct ConsoleLogSink;

impl LogSink for ConsoleLogSink {
    fn on_event(&self, event: &LogEvent) {
        let component = event.component.as_deref();
        match event.level {
            LogLevel::Debug => debug!(component, "{}", event.message),
            LogLevel::Info => info!(component, "{}", event.message),
            LogLevel::Warn => warn!(component, "{}", event.message),
            LogLevel::Error => error!(component, "{}", event.message),
        }
    }
}

/// Mirrors accepted error reports to the local console
pub struct ConsoleReportSink;

impl ReportSink for ConsoleReportSink {
    fn on_report(&self, report: &ErrorReport) {
        let id = report.id.as_str();
        match report.severity {
            Severity::Low => {
                info!(id, category = %report.category, "{}", report.message);
            }
            Severity::Medium => {
                warn!(id, category = %report.category, "{}", report.message);
            }
            Severity::High | Severity::Critical => {
                error!(
                    id,
                    category = %report.category,
                    severity = %report.severity,
                    "{}",
                    report.message
                );
            }
        }
    }
}
