//! # Beacon API
//!
//! Application-facing surface of the telemetry pipeline.
//!
//! This crate contains:
//! - [`TelemetryContext`]: the dependency-injection container wiring the
//!   core services to the HTTP collector, console sinks, and environment
//!   probe, and owning their flush workers
//! - The process-wide registry with lazy, first-config-wins construction
//!   and module-level convenience functions
//! - The idempotent panic-hook installer
//!
//! Most applications call [`init_telemetry`] once at startup and then use
//! the module-level functions; libraries and tests can instead construct a
//! [`TelemetryContext`] of their own and pass it around explicitly.

pub mod context;
pub mod hooks;
pub mod registry;

pub use context::{TelemetryConfig, TelemetryContext};
pub use hooks::install_panic_hook;
pub use registry::{
    force_flush, init_telemetry, log_debug, log_error, log_info, log_warn, log_with,
    mark_resolved, registry, report_api_error, report_error, report_network_error,
    shutdown_telemetry, TelemetryRegistry,
};
