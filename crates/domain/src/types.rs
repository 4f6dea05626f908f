//! Telemetry data types shared across the pipeline
//!
//! Everything here is a plain data carrier: construction happens at capture
//! time, mutation after enqueue is limited to [`ErrorReport::mark_resolved`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Log severity levels, totally ordered (`Debug < Info < Warn < Error`)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = crate::errors::TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(crate::errors::TelemetryError::InvalidInput(format!(
                "unknown log level: {other}"
            ))),
        }
    }
}

/// Error report severity, ordered from least to most alarming
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Error report category
///
/// The taxonomy is shared with the collector and other SDK clients, so the
/// variant names are part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Javascript,
    Network,
    Api,
    Ui,
    Unknown,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Javascript => write!(f, "javascript"),
            Category::Network => write!(f, "network"),
            Category::Api => write!(f, "api"),
            Category::Ui => write!(f, "ui"),
            Category::Unknown => write!(f, "unknown"),
        }
    }
}

/// Structured context attached to events and reports
///
/// A closed union of permitted value shapes so transport serialization is
/// total; arbitrary `serde_json::Value` payloads are not accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Bool(bool),
    Number(f64),
    String(String),
    Map(ContextMap),
}

/// String-keyed context mapping
pub type ContextMap = HashMap<String, ContextValue>;

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ContextValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for ContextValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<u16> for ContextValue {
    fn from(value: u16) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<ContextMap> for ContextValue {
    fn from(value: ContextMap) -> Self {
        Self::Map(value)
    }
}

/// A single structured log entry
///
/// Immutable once created; the logger stamps the session id at capture time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl LogEvent {
    /// Create a new log event stamped with the current time
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
            context: None,
            component: None,
            session_id: None,
        }
    }

    /// Attach structured context
    pub fn with_context(mut self, context: ContextMap) -> Self {
        self.context = Some(context);
        self
    }

    /// Tag the originating component
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Stamp the session identifier
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Capturing environment attached to every error report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub user_agent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A captured error incident
///
/// `resolved` and `resolution` are the only fields mutable after creation;
/// everything else is fixed at capture time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_stack: Option<String>,
    #[serde(flatten)]
    pub environment: Environment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub severity: Severity,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextMap>,
    /// Retries of the originating operation, not of this report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
    pub resolved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

impl ErrorReport {
    /// Create a new unresolved report with a fresh identifier
    pub fn new(
        message: impl Into<String>,
        severity: Severity,
        category: Category,
        environment: Environment,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            message: message.into(),
            stack_trace: None,
            component_stack: None,
            environment,
            user_id: None,
            session_id: None,
            severity,
            category,
            context: None,
            retry_count: None,
            resolved: false,
            resolution: None,
        }
    }

    /// Attach a stack trace
    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    /// Attach a UI component stack
    pub fn with_component_stack(mut self, component_stack: impl Into<String>) -> Self {
        self.component_stack = Some(component_stack.into());
        self
    }

    /// Attach structured context
    pub fn with_context(mut self, context: ContextMap) -> Self {
        self.context = Some(context);
        self
    }

    /// Stamp the user identifier
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Stamp the session identifier
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Record how often the originating operation was retried
    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = Some(retry_count);
        self
    }

    /// Mark this report as handled
    ///
    /// Idempotent: a second call leaves the first resolution in place and
    /// returns `false`.
    pub fn mark_resolved(&mut self, resolution: Option<String>) -> bool {
        if self.resolved {
            return false;
        }
        self.resolved = true;
        self.resolution = resolution;
        true
    }
}

/// Wire payload for one logger flush
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogBatch {
    pub events: Vec<LogEvent>,
    pub session_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Wire payload for one reporter flush
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBatch {
    pub errors: Vec<ErrorReport>,
    pub session_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate logger statistics, computed by one full queue pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    pub total: usize,
    pub by_level: HashMap<LogLevel, usize>,
}

/// Aggregate reporter statistics, computed by one full queue pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorStats {
    pub total: usize,
    pub by_severity: HashMap<Severity, usize>,
    pub by_category: HashMap<Category, usize>,
    pub unresolved: usize,
}

/// Snapshot filter for queued log events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    /// Keep events at or above this level
    pub min_level: Option<LogLevel>,
    /// Keep events tagged with this component
    pub component: Option<String>,
}

/// Snapshot filter for queued error reports
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    pub severity: Option<Severity>,
    pub category: Option<Category>,
    pub unresolved_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_levels_are_totally_ordered() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn severities_are_totally_ordered() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn log_level_parses_case_insensitively() {
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn mark_resolved_is_idempotent() {
        let mut report = ErrorReport::new(
            "boom",
            Severity::Low,
            Category::Javascript,
            Environment::default(),
        );

        assert!(report.mark_resolved(Some("restarted".into())));
        assert!(!report.mark_resolved(Some("ignored".into())));
        assert!(report.resolved);
        assert_eq!(report.resolution.as_deref(), Some("restarted"));
    }

    #[test]
    fn batch_serializes_with_camel_case_keys() {
        let batch = LogBatch {
            events: vec![LogEvent::new(LogLevel::Info, "hello").with_session_id("s-1")],
            session_id: Some("s-1".to_string()),
            timestamp: Utc::now(),
        };

        let json = serde_json::to_value(&batch).unwrap();
        assert!(json.get("sessionId").is_some());
        assert_eq!(json["events"][0]["sessionId"], "s-1");
        assert_eq!(json["events"][0]["level"], "info");
    }

    #[test]
    fn context_values_serialize_untagged() {
        let mut context = ContextMap::new();
        context.insert("status".into(), ContextValue::from(500_i64));
        context.insert("path".into(), ContextValue::from("/x"));
        context.insert("retriable".into(), ContextValue::from(true));

        let json = serde_json::to_value(&context).unwrap();
        assert_eq!(json["status"], 500.0);
        assert_eq!(json["path"], "/x");
        assert_eq!(json["retriable"], true);
    }

    #[test]
    fn report_environment_flattens_on_the_wire() {
        let report = ErrorReport::new(
            "boom",
            Severity::High,
            Category::Api,
            Environment { user_agent: "beacon/0.1".into(), url: Some("/home".into()) },
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["userAgent"], "beacon/0.1");
        assert_eq!(json["url"], "/home");
        assert_eq!(json["resolved"], false);
    }
}
