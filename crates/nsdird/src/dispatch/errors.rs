//! Error types for request dispatch failures.
//!
//! Every variant maps onto a response status with
//! [`DispatchError::status`]. Only channel failures end the channel; all
//! other errors are answered and the channel stays open.

use std::io;

use thiserror::Error;

use nsdir_proto::{FrameError, ResponseStatus};

use super::directory::DirectoryError;

/// Errors surfaced while reading, routing, or answering one request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request frame or its key fields could not be decoded.
    #[error("malformed request: {source}")]
    Malformed {
        #[source]
        source: FrameError,
    },

    /// A length prefix exceeded its limit.
    #[error("client supplied argument too large: {declared} bytes exceeds {max} byte limit")]
    ArgumentTooLarge { declared: usize, max: usize },

    /// No handler is registered for the request code.
    #[error("unknown request code {code}")]
    UnknownRequest { code: i32 },

    /// The directory could not be reached.
    #[error("directory unavailable: {message}")]
    DirectoryUnavailable { message: String },

    /// The directory answered with an error.
    #[error("directory search failed: {message}")]
    Directory { message: String },

    /// The response could not be encoded.
    #[error("failed to encode response: {source}")]
    Encode {
        #[source]
        source: FrameError,
    },

    /// IO error on the channel.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl DispatchError {
    /// Status reported to the client for this error.
    pub fn status(&self) -> ResponseStatus {
        match self {
            Self::Malformed { .. } | Self::ArgumentTooLarge { .. } => {
                ResponseStatus::ProtocolViolation
            }
            Self::UnknownRequest { .. } => ResponseStatus::UnknownRequest,
            Self::DirectoryUnavailable { .. } => ResponseStatus::Unavailable,
            Self::Directory { .. } | Self::Encode { .. } | Self::Io(_) => ResponseStatus::Internal,
        }
    }

    /// Returns `true` when the channel can no longer carry frames.
    pub fn is_channel_failure(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::Malformed { source } => source.is_channel_failure(),
            _ => false,
        }
    }

    /// Classifies a frame decoding error.
    pub fn from_frame(error: FrameError) -> Self {
        match error {
            FrameError::RequestTooLarge { declared, max }
            | FrameError::FieldTooLarge { declared, max } => {
                Self::ArgumentTooLarge { declared, max }
            }
            FrameError::Io(source) => Self::Io(source),
            source => Self::Malformed { source },
        }
    }

    /// Creates an unknown request error.
    pub fn unknown_request(code: i32) -> Self {
        Self::UnknownRequest { code }
    }

    /// Creates an encoding error.
    pub fn encode(source: FrameError) -> Self {
        Self::Encode { source }
    }
}

impl From<DirectoryError> for DispatchError {
    fn from(error: DirectoryError) -> Self {
        match error {
            DirectoryError::Unavailable { message } => Self::DirectoryUnavailable { message },
            DirectoryError::Failed { message } => Self::Directory { message },
        }
    }
}
