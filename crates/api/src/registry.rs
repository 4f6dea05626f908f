//! Process-wide telemetry registry and convenience API
//!
//! The registry owns at most one [`TelemetryContext`] per process, created
//! lazily on first access. Configuration is first-writer-wins: once a
//! context exists, later configurations are ignored and the existing
//! instance is returned. The module-level functions are thin calls into the
//! registry; they initialize it with defaults on first use and degrade to
//! no-ops if construction ever fails, so telemetry can never crash the host
//! application.

use beacon_core::scheduler::FlushOutcome;
use beacon_domain::{ContextMap, LogLevel, Result};
use once_cell::sync::OnceCell;
use tracing::warn;

use crate::context::{TelemetryConfig, TelemetryContext};

static GLOBAL: TelemetryRegistry = TelemetryRegistry::new();

/// Registry owning the process-wide telemetry context
pub struct TelemetryRegistry {
    context: OnceCell<TelemetryContext>,
}

impl TelemetryRegistry {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self { context: OnceCell::new() }
    }

    /// Get the context, building it from `config` on first call
    ///
    /// First-writer-wins: if a context already exists the given
    /// configuration is ignored.
    pub fn init(&self, config: TelemetryConfig) -> Result<&TelemetryContext> {
        self.context.get_or_try_init(|| TelemetryContext::new(config))
    }

    /// Get the context if it has been initialized
    pub fn get(&self) -> Option<&TelemetryContext> {
        self.context.get()
    }

    /// Get the context, building it with defaults on first use
    fn get_or_default(&self) -> Option<&TelemetryContext> {
        match self.context.get_or_try_init(|| TelemetryContext::new(TelemetryConfig::default())) {
            Ok(context) => Some(context),
            Err(e) => {
                warn!(error = %e, "telemetry initialization failed; dropping call");
                None
            }
        }
    }
}

impl Default for TelemetryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide registry
pub fn registry() -> &'static TelemetryRegistry {
    &GLOBAL
}

/// Initialize process-wide telemetry with the given configuration
///
/// Lazy and first-config-wins: calling this after the pipeline has been
/// used (or after a previous init) returns the existing context unchanged.
pub fn init_telemetry(config: TelemetryConfig) -> Result<&'static TelemetryContext> {
    GLOBAL.init(config)
}

/// Capture a `debug` log event
pub fn log_debug(message: impl Into<String>) {
    log_with(LogLevel::Debug, message, None, None);
}

/// Capture an `info` log event
pub fn log_info(message: impl Into<String>) {
    log_with(LogLevel::Info, message, None, None);
}

/// Capture a `warn` log event
pub fn log_warn(message: impl Into<String>) {
    log_with(LogLevel::Warn, message, None, None);
}

/// Capture an `error` log event
pub fn log_error(message: impl Into<String>) {
    log_with(LogLevel::Error, message, None, None);
}

/// Capture a log event with context and component tag
pub fn log_with(
    level: LogLevel,
    message: impl Into<String>,
    context: Option<ContextMap>,
    component: Option<&str>,
) {
    if let Some(ctx) = GLOBAL.get_or_default() {
        ctx.logger().log(level, message, context, component);
    }
}

/// Capture an error incident; returns the report id when captured
pub fn report_error(message: impl Into<String>, context: Option<ContextMap>) -> Option<String> {
    GLOBAL.get_or_default().map(|ctx| ctx.reporter().report_error(message, context, None, None))
}

/// Capture a failed network request
pub fn report_network_error(
    url: &str,
    method: &str,
    status: Option<u16>,
    response_body: Option<&str>,
    context: Option<ContextMap>,
) -> Option<String> {
    GLOBAL
        .get_or_default()
        .map(|ctx| ctx.reporter().report_network_error(url, method, status, response_body, context))
}

/// Capture a failed API call
pub fn report_api_error(
    endpoint: &str,
    method: &str,
    status: u16,
    response_data: Option<&str>,
    context: Option<ContextMap>,
) -> Option<String> {
    GLOBAL
        .get_or_default()
        .map(|ctx| ctx.reporter().report_api_error(endpoint, method, status, response_data, context))
}

/// Mark a queued report as handled
pub fn mark_resolved(id: &str, resolution: Option<&str>) -> bool {
    GLOBAL.get().map_or(false, |ctx| ctx.reporter().mark_resolved(id, resolution))
}

/// Flush both subsystems once, awaiting completion
pub async fn force_flush() -> Option<(FlushOutcome, FlushOutcome)> {
    match GLOBAL.get() {
        Some(ctx) => Some(ctx.force_flush().await),
        None => None,
    }
}

/// Stop the flush workers of the process-wide context
///
/// Queued events are retained; no further flush is scheduled.
pub async fn shutdown_telemetry() -> Result<()> {
    match GLOBAL.get() {
        Some(ctx) => ctx.shutdown().await,
        None => Ok(()),
    }
}
