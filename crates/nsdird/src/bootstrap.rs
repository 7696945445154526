//! Daemon bootstrap orchestration.

use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;
use tracing::debug;

use nsdir_config::{Config, DirectoryConfig, SocketPreparationError};

use crate::discovery::{DISCOVERY_TARGET, DiscoveryError, DiscoveryPass, PublishedConfig, SrvResolver};
use crate::health::HealthReporter;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that hands out a configuration resolved earlier.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already loaded configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// Socket preparation failed.
    #[error("failed to prepare daemon socket: {source}")]
    Socket {
        /// Filesystem error reported while preparing the socket directory.
        #[source]
        source: SocketPreparationError,
    },
}

/// Result of a successful bootstrap invocation.
pub struct Daemon<R> {
    config: Config,
    resolver: R,
    published: Arc<PublishedConfig>,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl<R> Daemon<R> {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Shared handle on the published directory configuration.
    #[must_use]
    pub fn published(&self) -> Arc<PublishedConfig> {
        Arc::clone(&self.published)
    }

    /// Current directory configuration snapshot.
    #[must_use]
    pub fn directory(&self) -> Arc<DirectoryConfig> {
        self.published.load()
    }
}

impl<R> Daemon<R>
where
    R: SrvResolver,
{
    /// Runs a discovery pass and publishes its result.
    ///
    /// # Errors
    ///
    /// Returns the pass's error. The previously published configuration
    /// remains in use.
    pub fn refresh_directory(&self) -> Result<Arc<DirectoryConfig>, DiscoveryError> {
        let capacity = self.config.discovery_buffer_bytes();
        self.reporter.discovery_starting(capacity);
        let pass = DiscoveryPass::new(&self.resolver, capacity);
        match self.published.refresh(&pass) {
            Ok(directory) => {
                self.reporter.discovery_succeeded(&directory);
                Ok(directory)
            }
            Err(error) => {
                self.reporter.discovery_failed(&error);
                Err(error)
            }
        }
    }
}

/// Bootstraps the daemon using the supplied collaborators.
///
/// The initial discovery pass runs last. Its failure is reported but does
/// not fail bootstrap: the static directory configuration stays published.
pub fn bootstrap_with<R>(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    resolver: R,
) -> Result<Daemon<R>, BootstrapError>
where
    R: SrvResolver,
{
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    if let Err(source) = config.daemon_socket().prepare_filesystem() {
        let error = BootstrapError::Socket { source };
        reporter.bootstrap_failed(&error);
        return Err(error);
    }

    let published = Arc::new(PublishedConfig::new(config.directory()));
    let daemon = Daemon {
        config,
        resolver,
        published,
        telemetry,
        reporter,
    };
    if let Err(error) = daemon.refresh_directory() {
        debug!(
            target: DISCOVERY_TARGET,
            error = %error,
            "continuing with static directory configuration"
        );
    }
    daemon.reporter.bootstrap_succeeded(&daemon.config);

    Ok(daemon)
}
