//! Per-subsystem configuration
//!
//! Both subsystems are configured at construction only; there is no runtime
//! reconfiguration surface. `validate()` catches structurally invalid
//! settings up front, while a merely unusable remote setup (reporting
//! enabled, endpoint absent) degrades to local-only operation at runtime.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::LogLevel;

mod duration_millis {
    use std::time::Duration;

    use serde::ser::Error as SerError;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(duration.as_millis()).map_err(|_| {
            S::Error::custom("duration too large to fit into a 64-bit millisecond representation")
        })?;
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

const DEFAULT_MAX_STORED_LOGS: usize = 200;
const DEFAULT_LOG_BATCH_SIZE: usize = 50;
const DEFAULT_LOG_FLUSH_INTERVAL: Duration = Duration::from_secs(30);

const DEFAULT_MAX_STORED_ERRORS: usize = 100;
const DEFAULT_ERROR_BATCH_SIZE: usize = 10;
const DEFAULT_ERROR_FLUSH_INTERVAL: Duration = Duration::from_secs(60);

/// Logger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggerConfig {
    /// Mirror every accepted event to the local console sink
    pub enable_console_logging: bool,
    /// Gate the network transport entirely
    pub enable_remote_logging: bool,
    /// Transport target; absence disables transport even when the flag is set
    pub remote_endpoint: Option<String>,
    /// Queue capacity; the oldest entry is evicted beyond this
    pub max_stored_logs: usize,
    /// Maximum events per delivery attempt
    pub batch_size: usize,
    /// Periodic flush timer; zero disables the timer
    #[serde(rename = "flushIntervalMs", with = "duration_millis")]
    pub flush_interval: Duration,
    /// Events below this level are discarded before entering the queue
    pub min_level: LogLevel,
    /// Stamp a process-lifetime session id on every event
    pub enable_session_tracking: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            enable_console_logging: true,
            enable_remote_logging: false,
            remote_endpoint: None,
            max_stored_logs: DEFAULT_MAX_STORED_LOGS,
            batch_size: DEFAULT_LOG_BATCH_SIZE,
            flush_interval: DEFAULT_LOG_FLUSH_INTERVAL,
            min_level: LogLevel::Info,
            enable_session_tracking: true,
        }
    }
}

impl LoggerConfig {
    /// Validate configuration consistency
    pub fn validate(&self) -> Result<(), String> {
        validate_capacity(self.max_stored_logs, self.batch_size)?;
        validate_endpoint(self.remote_endpoint.as_deref())
    }
}

/// Error reporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReporterConfig {
    /// Mirror every accepted report to the local console sink
    pub enable_console_logging: bool,
    /// Gate the network transport entirely
    pub enable_remote_reporting: bool,
    /// Transport target; absence disables transport even when the flag is set
    pub remote_endpoint: Option<String>,
    /// Queue capacity; the oldest report is evicted beyond this
    pub max_stored_errors: usize,
    /// Maximum reports per delivery attempt
    pub batch_size: usize,
    /// Periodic flush timer; zero disables the timer
    #[serde(rename = "flushIntervalMs", with = "duration_millis")]
    pub flush_interval: Duration,
    /// Stamp the configured user id on every report
    pub enable_user_tracking: bool,
    /// Stamp a process-lifetime session id on every report
    pub enable_session_tracking: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            enable_console_logging: true,
            enable_remote_reporting: false,
            remote_endpoint: None,
            max_stored_errors: DEFAULT_MAX_STORED_ERRORS,
            batch_size: DEFAULT_ERROR_BATCH_SIZE,
            flush_interval: DEFAULT_ERROR_FLUSH_INTERVAL,
            enable_user_tracking: true,
            enable_session_tracking: true,
        }
    }
}

impl ReporterConfig {
    /// Validate configuration consistency
    pub fn validate(&self) -> Result<(), String> {
        validate_capacity(self.max_stored_errors, self.batch_size)?;
        validate_endpoint(self.remote_endpoint.as_deref())
    }
}

fn validate_capacity(capacity: usize, batch_size: usize) -> Result<(), String> {
    if capacity == 0 {
        return Err("queue capacity must be greater than zero".to_string());
    }
    if batch_size == 0 {
        return Err("batch size must be greater than zero".to_string());
    }
    Ok(())
}

fn validate_endpoint(endpoint: Option<&str>) -> Result<(), String> {
    let Some(endpoint) = endpoint else {
        return Ok(());
    };

    let parsed =
        Url::parse(endpoint).map_err(|e| format!("invalid remote endpoint {endpoint:?}: {e}"))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(format!("unsupported endpoint scheme {scheme:?}: expected http or https")),
    }
}
