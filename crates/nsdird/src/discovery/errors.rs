//! Error surface of a discovery pass.

use thiserror::Error;

use super::buffer::Overflow;
use super::resolver::ResolverError;

/// Reasons a discovery pass did not produce a configuration.
///
/// `Overflow` can be retried with a larger buffer, `NotFound` needs a
/// configuration change, and `Unavailable` is transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// Discovered output did not fit the pass's buffer.
    #[error(transparent)]
    Overflow(#[from] Overflow),
    /// Nothing to discover: no default domain or no SRV answer.
    #[error("directory servers not found: {reason}")]
    NotFound {
        /// What was missing.
        reason: String,
    },
    /// The resolver could not be used.
    #[error("directory discovery unavailable: {message}")]
    Unavailable {
        /// Underlying resolver failure.
        message: String,
    },
}

impl DiscoveryError {
    /// Creates a not-found error.
    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::NotFound {
            reason: reason.into(),
        }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Short name for structured logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Overflow(_) => "overflow",
            Self::NotFound { .. } => "not_found",
            Self::Unavailable { .. } => "unavailable",
        }
    }
}

impl From<ResolverError> for DiscoveryError {
    fn from(error: ResolverError) -> Self {
        match error {
            ResolverError::NoRecords { .. } => Self::not_found(error.to_string()),
            ResolverError::Unavailable { .. } | ResolverError::Transport { .. } => {
                Self::unavailable(error.to_string())
            }
        }
    }
}
