//! Telemetry context - dependency injection container

use std::sync::Arc;

use beacon_core::scheduler::{FlushOutcome, FlushTarget, FlushWorker, FlushWorkerConfig};
use beacon_core::{ErrorReporter, EventLogger};
use beacon_domain::{LoggerConfig, ReporterConfig, Result};
use beacon_infra::{
    CollectorClient, CollectorConfig, ConsoleLogSink, ConsoleReportSink, SystemEnvironment,
};
use tokio::sync::Mutex;
use tracing::info;

/// Top-level configuration for one telemetry context
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Application name used in the transport user agent
    pub app_name: String,
    /// Application version used in the transport user agent
    pub app_version: String,
    pub logger: LoggerConfig,
    pub reporter: ReporterConfig,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            app_name: "beacon".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            logger: LoggerConfig::default(),
            reporter: ReporterConfig::default(),
        }
    }
}

/// Telemetry context - holds both services and their flush workers
///
/// Construction wires the logger and reporter to the HTTP collector (when a
/// remote endpoint is configured), registers console sinks, and starts the
/// flush workers. Workers need an active Tokio runtime; without one the
/// pipeline still captures locally and `force_flush` keeps working once a
/// runtime exists.
pub struct TelemetryContext {
    logger: Arc<EventLogger>,
    reporter: Arc<ErrorReporter>,
    environment: Arc<SystemEnvironment>,
    logger_worker: Mutex<FlushWorker>,
    reporter_worker: Mutex<FlushWorker>,
}

impl TelemetryContext {
    /// Build and start a telemetry context
    pub fn new(config: TelemetryConfig) -> Result<Self> {
        let environment =
            Arc::new(SystemEnvironment::new(&config.app_name, &config.app_version));
        let user_agent = format!("{}/{}", config.app_name, config.app_version);

        let logger_remote = remote_endpoint(
            config.logger.enable_remote_logging,
            config.logger.remote_endpoint.as_deref(),
        );
        let mut logger = EventLogger::new(config.logger.clone())?;
        if let Some(endpoint) = logger_remote {
            let collector = build_collector(endpoint, &user_agent)?;
            logger = logger.with_transport(Arc::new(collector));
        }
        let logger = Arc::new(logger);
        if config.logger.enable_console_logging {
            logger.register_sink(Arc::new(ConsoleLogSink));
        }

        let reporter_remote = remote_endpoint(
            config.reporter.enable_remote_reporting,
            config.reporter.remote_endpoint.as_deref(),
        );
        let mut reporter = ErrorReporter::new(config.reporter.clone())?
            .with_environment(environment.clone());
        if let Some(endpoint) = reporter_remote {
            let collector = build_collector(endpoint, &user_agent)?;
            reporter = reporter.with_transport(Arc::new(collector));
        }
        let reporter = Arc::new(reporter);
        if config.reporter.enable_console_logging {
            reporter.register_sink(Arc::new(ConsoleReportSink));
        }

        let mut logger_worker = FlushWorker::new(
            logger.clone() as Arc<dyn FlushTarget>,
            FlushWorkerConfig { interval: config.logger.flush_interval, ..Default::default() },
        );
        if logger_remote.is_some() {
            logger_worker.start()?;
        }

        let mut reporter_worker = FlushWorker::new(
            reporter.clone() as Arc<dyn FlushTarget>,
            FlushWorkerConfig { interval: config.reporter.flush_interval, ..Default::default() },
        )
        .with_wakeup(reporter.escalation_signal());
        if reporter_remote.is_some() {
            reporter_worker.start()?;
        }

        info!(
            remote_logging = logger_remote.is_some(),
            remote_reporting = reporter_remote.is_some(),
            "telemetry context initialized"
        );

        Ok(Self {
            logger,
            reporter,
            environment,
            logger_worker: Mutex::new(logger_worker),
            reporter_worker: Mutex::new(reporter_worker),
        })
    }

    /// The structured logger
    pub fn logger(&self) -> &Arc<EventLogger> {
        &self.logger
    }

    /// The error reporter
    pub fn reporter(&self) -> &Arc<ErrorReporter> {
        &self.reporter
    }

    /// The environment probe shared with the reporter
    pub fn environment(&self) -> &Arc<SystemEnvironment> {
        &self.environment
    }

    /// Flush both subsystems once, awaiting completion
    pub async fn force_flush(&self) -> (FlushOutcome, FlushOutcome) {
        (self.logger.force_flush().await, self.reporter.force_flush().await)
    }

    /// Stop both flush workers
    ///
    /// Queued events are retained in memory; callers wanting one last
    /// delivery attempt flush before shutting down.
    pub async fn shutdown(&self) -> Result<()> {
        self.logger_worker.lock().await.stop().await?;
        self.reporter_worker.lock().await.stop().await?;
        info!("telemetry context shut down");
        Ok(())
    }
}

fn remote_endpoint(enabled: bool, endpoint: Option<&str>) -> Option<&str> {
    if enabled {
        endpoint
    } else {
        None
    }
}

fn build_collector(endpoint: &str, user_agent: &str) -> Result<CollectorClient> {
    let mut config = CollectorConfig::new(endpoint);
    config.user_agent = Some(user_agent.to_string());
    CollectorClient::new(config).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_only_context_builds_without_a_runtime() {
        let context = TelemetryContext::new(TelemetryConfig::default()).unwrap();

        context.logger().info("captured locally");
        context.reporter().report_error("boom", None, None, None);

        assert_eq!(context.logger().queued(), 1);
        assert_eq!(context.reporter().queued(), 1);
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let config = TelemetryConfig {
            logger: LoggerConfig { max_stored_logs: 0, ..Default::default() },
            ..Default::default()
        };

        assert!(TelemetryContext::new(config).is_err());
    }

    #[tokio::test]
    async fn misconfigured_remote_degrades_to_local_only() {
        // Remote enabled but no endpoint: transport stays off, capture works.
        let config = TelemetryConfig {
            reporter: ReporterConfig { enable_remote_reporting: true, ..Default::default() },
            ..Default::default()
        };
        let context = TelemetryContext::new(config).unwrap();

        context.reporter().report_error("boom", None, None, None);
        let (_, reporter_outcome) = context.force_flush().await;

        assert_eq!(reporter_outcome, FlushOutcome::Disabled);
        assert_eq!(context.reporter().queued(), 1);

        context.shutdown().await.unwrap();
    }
}
