//! Shared configuration for the nsdir daemon and its tooling.
//!
//! Configuration is layered with [`ortho_config`]: built-in defaults are
//! overridden by a TOML file (`--config-path` or `NSDIR_CONFIG_PATH`), then by
//! `NSDIR_*` environment variables, then by command-line flags.
//!
//! Besides the daemon socket and logging settings, the configuration carries
//! the directory discovery inputs: an optional base DN, an optional explicit
//! SRV query name, statically configured server URIs, and the byte budget a
//! single discovery pass may consume. [`Config::directory`] projects those
//! into a [`DirectoryConfig`] value that the daemon refines at runtime.

mod defaults;
mod directory;
mod logging;
mod socket;

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_DISCOVERY_BUFFER_BYTES, DEFAULT_LOG_FILTER, DEFAULT_TCP_PORT,
    default_discovery_buffer_bytes, default_log_filter, default_log_filter_string,
    default_log_format, default_socket_endpoint,
};
pub use directory::DirectoryConfig;
pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{SocketEndpoint, SocketParseError, SocketPreparationError};

/// Resolved configuration for the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "NSDIR")]
pub struct Config {
    /// Endpoint the daemon listens on for lookup clients.
    #[ortho_config(default = default_socket_endpoint())]
    pub daemon_socket: SocketEndpoint,
    /// `tracing_subscriber::EnvFilter` expression.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Search base DN. Derived from the default domain when absent.
    pub base: Option<String>,
    /// Explicit SRV query name, for example `_ldap._tcp.example.org.`.
    pub srv_domain: Option<String>,
    /// Overrides the default search domain reported by the system resolver.
    pub default_domain: Option<String>,
    /// Statically configured directory server URIs.
    #[ortho_config(merge_strategy = "append")]
    pub uri: Vec<String>,
    /// Capacity in bytes of the buffer owned by one discovery pass.
    #[ortho_config(default = default_discovery_buffer_bytes())]
    pub discovery_buffer_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daemon_socket: default_socket_endpoint(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            base: None,
            srv_domain: None,
            default_domain: None,
            uri: Vec::new(),
            discovery_buffer_bytes: DEFAULT_DISCOVERY_BUFFER_BYTES,
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns the aggregated loader error when any layer fails to parse.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        <Self as OrthoConfig>::load()
    }

    /// Loads configuration from an explicit argument iterator.
    ///
    /// The first item is treated as the binary name, matching
    /// [`std::env::args_os`].
    ///
    /// # Errors
    ///
    /// Returns the aggregated loader error when any layer fails to parse.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Endpoint the daemon binds for client channels.
    #[must_use]
    pub fn daemon_socket(&self) -> &SocketEndpoint {
        &self.daemon_socket
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Default search domain override, when configured.
    #[must_use]
    pub fn default_domain(&self) -> Option<&str> {
        self.default_domain.as_deref()
    }

    /// Byte budget for a single discovery pass.
    #[must_use]
    pub fn discovery_buffer_bytes(&self) -> usize {
        self.discovery_buffer_bytes
    }

    /// Static directory configuration as loaded, before any discovery.
    #[must_use]
    pub fn directory(&self) -> DirectoryConfig {
        DirectoryConfig::new(self.srv_domain.clone(), self.base.clone(), self.uri.clone())
    }
}
