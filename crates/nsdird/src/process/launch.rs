//! Supervises daemon launch sequencing and runtime orchestration.

use std::sync::Arc;

use tracing::{info, warn};

use nsdir_config::Config;

use crate::StructuredHealthReporter;
use crate::bootstrap::{ConfigLoader, StaticConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::discovery::{SrvResolver, SystemResolver};
use crate::dispatch::{
    DirectoryClient, DispatchConnectionHandler, DispatchTable, UnconfiguredDirectory,
};
use crate::health::HealthReporter;
use crate::transport::SocketListener;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::signals::{ProcessSignal, SignalSource, SystemSignals};

/// Collaborators required to launch the daemon runtime.
pub(crate) struct LaunchPlan<L, F, S> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    /// Builds the resolver once the configuration is known.
    pub(crate) resolver: F,
    pub(crate) client: Arc<dyn DirectoryClient>,
    pub(crate) signals: S,
}

/// Runs the daemon using the production collaborators.
///
/// # Errors
///
/// Returns [`LaunchError`] when signal handlers cannot be installed, the
/// configuration does not load, bootstrap fails, or the listener cannot
/// start.
pub fn run_daemon() -> Result<(), LaunchError> {
    let signals = SystemSignals::install()?;
    let plan = LaunchPlan {
        loader: SystemConfigLoader,
        reporter: Arc::new(StructuredHealthReporter::new()),
        resolver: |config: &Config| {
            SystemResolver::from_system_conf()
                .with_default_domain(config.default_domain().map(str::to_owned))
        },
        client: Arc::new(UnconfiguredDirectory),
        signals,
    };
    run_daemon_with(plan)
}

/// Runs the daemon with injected collaborators.
///
/// Returns after a shutdown signal once the listener has stopped.
pub(crate) fn run_daemon_with<L, F, R, S>(plan: LaunchPlan<L, F, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    F: FnOnce(&Config) -> R,
    R: SrvResolver,
    S: SignalSource,
{
    let LaunchPlan {
        loader,
        reporter,
        resolver,
        client,
        mut signals,
    } = plan;

    let config = loader.load()?;
    let resolver = resolver(&config);
    // Telemetry is installed by bootstrap; nothing is logged before it.
    let daemon = bootstrap_with(&StaticConfigLoader::new(config), reporter, resolver)?;

    let listener = SocketListener::bind(daemon.config().daemon_socket())?;
    let handler = Arc::new(DispatchConnectionHandler::new(
        DispatchTable::standard(),
        client,
        daemon.published(),
    ));
    let listener_handle = listener.start(handler)?;
    info!(
        target: PROCESS_TARGET,
        socket = %daemon.config().daemon_socket(),
        "daemon runtime started"
    );

    loop {
        match signals.next_signal() {
            ProcessSignal::Reload => {
                if let Err(error) = daemon.refresh_directory() {
                    warn!(
                        target: PROCESS_TARGET,
                        %error,
                        "reload kept the previous directory configuration"
                    );
                }
            }
            ProcessSignal::Shutdown => break,
        }
    }

    listener_handle.shutdown();
    listener_handle.join()?;
    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}
