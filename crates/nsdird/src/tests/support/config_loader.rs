//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::OrthoError;
use tempfile::TempDir;

use nsdir_config::{Config, SocketEndpoint};

use crate::bootstrap::ConfigLoader;

/// Loader that places the daemon socket under a temporary directory.
///
/// Directory settings start empty and can be adjusted with
/// [`TestConfigLoader::configure`].
pub struct TestConfigLoader {
    socket_dir: Arc<TempDir>,
    template: Config,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        let socket_dir = TempDir::new().expect("failed to create temporary directory for socket");
        let path = socket_dir.path().join("nsdird.sock");
        let template = Config {
            daemon_socket: SocketEndpoint::unix(
                path.to_str()
                    .expect("temporary socket path was not valid UTF-8")
                    .to_owned(),
            ),
            ..Config::default()
        };
        Self {
            socket_dir: Arc::new(socket_dir),
            template,
        }
    }

    /// Adjusts the configuration returned by every load.
    pub fn configure(&mut self, adjust: impl FnOnce(&mut Config)) {
        adjust(&mut self.template);
    }

    /// Directory holding the socket.
    #[must_use]
    pub fn socket_dir(&self) -> &TempDir {
        &self.socket_dir
    }
}

impl Default for TestConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.template.clone())
    }
}

/// Loader that intentionally fails by passing an invalid socket flag.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("nsdird"),
            OsString::from("--daemon-socket"),
            OsString::from("invalid://socket"),
        ];
        Config::load_from_iter(args)
    }
}
