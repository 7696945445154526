//! Signal handling for reload and shutdown.

use std::io;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::info;

use super::PROCESS_TARGET;

/// What the daemon should do in response to a delivered signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessSignal {
    /// Re-run service discovery and publish the result.
    Reload,
    /// Stop accepting channels and exit.
    Shutdown,
}

impl ProcessSignal {
    /// Maps a raw signal number. `SIGHUP` reloads; everything else stops.
    #[must_use]
    pub fn from_raw(signal: i32) -> Self {
        if signal == SIGHUP {
            Self::Reload
        } else {
            Self::Shutdown
        }
    }
}

/// Errors reported by signal sources.
#[derive(Debug, Error)]
pub enum SignalError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Source of process signals; blocks until the next one arrives.
pub trait SignalSource: Send {
    /// Waits for the next signal.
    fn next_signal(&mut self) -> ProcessSignal;
}

/// Signal source backed by `signal-hook`.
///
/// Handlers are installed on construction so signals delivered during
/// bootstrap are queued rather than lost.
pub struct SystemSignals {
    signals: Signals,
}

impl SystemSignals {
    /// Installs handlers for `SIGHUP`, `SIGTERM`, `SIGINT` and `SIGQUIT`.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::Install`] when registration fails.
    pub fn install() -> Result<Self, SignalError> {
        let signals = Signals::new([SIGHUP, SIGTERM, SIGINT, SIGQUIT])
            .map_err(|source| SignalError::Install { source })?;
        Ok(Self { signals })
    }
}

impl SignalSource for SystemSignals {
    fn next_signal(&mut self) -> ProcessSignal {
        // The iterator only ends once the handle is closed.
        let Some(signal) = self.signals.forever().next() else {
            return ProcessSignal::Shutdown;
        };
        let action = ProcessSignal::from_raw(signal);
        info!(target: PROCESS_TARGET, signal, ?action, "signal received");
        action
    }
}
