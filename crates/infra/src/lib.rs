//! # Beacon Infra
//!
//! Adapter layer for the telemetry pipeline.
//!
//! This crate contains:
//! - The reqwest-backed HTTP client wrapper
//! - The collector client implementing the transport ports
//! - Tracing-backed console sinks
//! - The system environment probe
//!
//! ## Architecture Principles
//! - Implements the port traits defined in `beacon-core`
//! - All network and platform code lives here

pub mod collector;
pub mod console;
pub mod environment;
pub mod errors;
pub mod http;

pub use collector::{CollectorClient, CollectorConfig};
pub use console::{ConsoleLogSink, ConsoleReportSink};
pub use environment::SystemEnvironment;
pub use errors::{TransportError, TransportErrorCategory};
pub use http::HttpClient;
