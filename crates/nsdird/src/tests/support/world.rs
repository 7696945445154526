//! BDD test world: loader, reporter, resolver, and the daemon they produce.

use std::cell::RefCell;
use std::sync::Arc;

use nsdir_config::{Config, DirectoryConfig};

use crate::bootstrap::{BootstrapError, ConfigLoader, Daemon, bootstrap_with};
use crate::discovery::DiscoveryError;

use super::config_loader::{FailingConfigLoader, TestConfigLoader};
use super::reporter::RecordingHealthReporter;
use super::resolver::ScriptedResolver;

/// Scenario world shared across BDD steps.
pub struct TestWorld {
    loader: TestConfigLoader,
    failing: bool,
    pub reporter: Arc<RecordingHealthReporter>,
    pub resolver: ScriptedResolver,
    daemon: Option<Daemon<ScriptedResolver>>,
    bootstrap_error: Option<BootstrapError>,
    refresh_result: Option<Result<Arc<DirectoryConfig>, DiscoveryError>>,
}

impl TestWorld {
    /// Builds a world with a successful configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            loader: TestConfigLoader::new(),
            failing: false,
            reporter: Arc::new(RecordingHealthReporter::default()),
            resolver: ScriptedResolver::default(),
            daemon: None,
            bootstrap_error: None,
            refresh_result: None,
        }
    }

    /// Installs a loader that always fails.
    pub fn use_failing_loader(&mut self) {
        self.failing = true;
    }

    /// Adjusts the configuration the loader returns.
    pub fn configure(&mut self, adjust: impl FnOnce(&mut Config)) {
        self.loader.configure(adjust);
    }

    /// Runs the bootstrap sequence once.
    pub fn bootstrap(&mut self) {
        if self.daemon.is_some() || self.bootstrap_error.is_some() {
            return;
        }
        let loader: &dyn ConfigLoader = if self.failing {
            &FailingConfigLoader
        } else {
            &self.loader
        };
        match bootstrap_with(loader, self.reporter.clone(), self.resolver.clone()) {
            Ok(daemon) => self.daemon = Some(daemon),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    /// Re-runs discovery on the bootstrapped daemon.
    pub fn reload(&mut self) {
        if let Some(daemon) = self.daemon.as_ref() {
            self.refresh_result = Some(daemon.refresh_directory());
        }
    }

    #[must_use]
    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    #[must_use]
    pub fn daemon_started(&self) -> bool {
        self.daemon.is_some()
    }

    /// Result of the last reload, if any.
    #[must_use]
    pub fn refresh_result(&self) -> Option<&Result<Arc<DirectoryConfig>, DiscoveryError>> {
        self.refresh_result.as_ref()
    }

    /// Currently published directory configuration.
    #[must_use]
    pub fn directory(&self) -> Option<Arc<DirectoryConfig>> {
        self.daemon.as_ref().map(Daemon::directory)
    }

    /// Socket directory of the successful loader.
    #[must_use]
    pub fn loader(&self) -> &TestConfigLoader {
        &self.loader
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Default test world fixture.
#[must_use]
pub fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}
