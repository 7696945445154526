//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::sync::Mutex;

use nsdir_config::{Config, DirectoryConfig};

use crate::bootstrap::BootstrapError;
use crate::discovery::DiscoveryError;
use crate::health::HealthReporter;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    DiscoveryStarting(usize),
    /// Published configuration after a successful pass.
    DiscoverySucceeded(DirectoryConfig),
    /// Failure kind as reported by [`DiscoveryError::kind`].
    DiscoveryFailed(&'static str),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    /// Failure kinds of every failed discovery pass, in order.
    #[must_use]
    pub fn discovery_failures(&self) -> Vec<&'static str> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HealthEvent::DiscoveryFailed(kind) => Some(kind),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn discovery_starting(&self, capacity: usize) {
        self.record(HealthEvent::DiscoveryStarting(capacity));
    }

    fn discovery_succeeded(&self, directory: &DirectoryConfig) {
        self.record(HealthEvent::DiscoverySucceeded(directory.clone()));
    }

    fn discovery_failed(&self, error: &DiscoveryError) {
        self.record(HealthEvent::DiscoveryFailed(error.kind()));
    }
}
