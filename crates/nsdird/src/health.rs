//! Structured health reporting for daemon lifecycle events.

use std::sync::Arc;

use nsdir_config::{Config, DirectoryConfig};

use crate::bootstrap::BootstrapError;
use crate::discovery::DiscoveryError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked before a discovery pass runs.
    fn discovery_starting(&self, capacity: usize);

    /// Invoked after a discovery pass result has been published.
    fn discovery_succeeded(&self, directory: &DirectoryConfig);

    /// Invoked when a discovery pass fails; the previous configuration stays.
    fn discovery_failed(&self, error: &DiscoveryError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn discovery_starting(&self, capacity: usize) {
        (**self).discovery_starting(capacity);
    }

    fn discovery_succeeded(&self, directory: &DirectoryConfig) {
        (**self).discovery_succeeded(directory);
    }

    fn discovery_failed(&self, error: &DiscoveryError) {
        (**self).discovery_failed(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting daemon bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            socket = %config.daemon_socket(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "daemon bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "daemon bootstrap failed"
        );
    }

    fn discovery_starting(&self, capacity: usize) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "discovery_starting",
            capacity,
            "starting directory discovery"
        );
    }

    fn discovery_succeeded(&self, directory: &DirectoryConfig) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "discovery_succeeded",
            base = directory.base().unwrap_or_default(),
            uris = ?directory.uris(),
            "directory configuration published"
        );
    }

    fn discovery_failed(&self, error: &DiscoveryError) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "discovery_failed",
            kind = error.kind(),
            error = %error,
            "directory discovery failed; keeping previous configuration"
        );
    }
}
