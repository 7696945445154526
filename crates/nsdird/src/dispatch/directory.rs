//! Directory client seam used by lookup handlers.

use thiserror::Error;
use tracing::warn;

use nsdir_config::DirectoryConfig;
use nsdir_proto::Entry;

use super::request::SearchRequest;
use super::router::DISPATCH_TARGET;

/// Errors reported by a directory client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// No directory server could be reached.
    #[error("directory unavailable: {message}")]
    Unavailable { message: String },
    /// The server rejected or failed the search.
    #[error("directory search failed: {message}")]
    Failed { message: String },
}

impl DirectoryError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a search failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Runs searches against the directory described by the published
/// configuration.
///
/// Handlers pass the snapshot they loaded for the request, so one request
/// never sees two different configurations.
#[cfg_attr(test, mockall::automock)]
pub trait DirectoryClient: Send + Sync {
    /// Returns the entries matching `request`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the directory cannot answer.
    fn search(
        &self,
        directory: &DirectoryConfig,
        request: &SearchRequest,
    ) -> Result<Vec<Entry>, DirectoryError>;
}

/// Client used until a directory backend is wired in.
///
/// Every search succeeds with no entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredDirectory;

impl DirectoryClient for UnconfiguredDirectory {
    fn search(
        &self,
        directory: &DirectoryConfig,
        request: &SearchRequest,
    ) -> Result<Vec<Entry>, DirectoryError> {
        warn!(
            target: DISPATCH_TARGET,
            request = request.code().name(),
            key = %request.key(),
            uris = directory.uris().len(),
            "directory search requested but no directory client is configured"
        );
        Ok(Vec::new())
    }
}
