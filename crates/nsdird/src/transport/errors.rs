//! Failures raised while bringing up the client channel listener.

use std::io;

use thiserror::Error;

/// Errors surfaced before the listener starts accepting.
///
/// Once channels are being served, per-channel failures are logged by the
/// connection handler and never reach this type.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("listen address {endpoint} did not resolve")]
    Unresolved {
        endpoint: String,
        #[source]
        source: Option<io::Error>,
    },
    #[error("failed to bind {endpoint}: {source}")]
    Bind {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    #[error("socket {path} is served by a running daemon")]
    SocketInUse { path: String },
    #[error("{path} exists and is not a socket")]
    NotASocket { path: String },
    #[error("failed to reclaim stale socket {path}: {source}")]
    Reclaim {
        path: String,
        #[source]
        source: io::Error,
    },
    #[cfg(not(unix))]
    #[error("unix sockets are unsupported for endpoint {endpoint}")]
    UnsupportedUnix { endpoint: String },
    #[error("failed to switch the listener to non-blocking accepts: {source}")]
    Configure {
        #[source]
        source: io::Error,
    },
    #[error("failed to spawn the accept thread: {source}")]
    Spawn {
        #[source]
        source: io::Error,
    },
    #[error("accept thread panicked")]
    AcceptPanicked,
}

impl ListenerError {
    pub(crate) fn bind(endpoint: impl ToString, source: io::Error) -> Self {
        Self::Bind {
            endpoint: endpoint.to_string(),
            source,
        }
    }

    pub(crate) fn reclaim(path: impl ToString, source: io::Error) -> Self {
        Self::Reclaim {
            path: path.to_string(),
            source,
        }
    }
}
