//! Errors raised while encoding or decoding frames.

use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;

/// Errors surfaced by the frame codec.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The underlying channel failed.
    #[error("channel IO error: {0}")]
    Io(#[from] io::Error),

    /// The channel ended in the middle of a frame.
    #[error("channel closed mid-frame")]
    UnexpectedEof,

    /// The frame header carried an unknown protocol version.
    #[error("unsupported protocol version {found}")]
    UnsupportedVersion {
        /// Version found in the header.
        found: i32,
    },

    /// The declared request body exceeds the accepted maximum.
    #[error("request body of {declared} bytes exceeds {max} byte limit")]
    RequestTooLarge {
        /// Length declared by the client.
        declared: usize,
        /// Accepted maximum.
        max: usize,
    },

    /// A length-prefixed field exceeds the accepted maximum.
    #[error("field of {declared} bytes exceeds {max} byte limit")]
    FieldTooLarge {
        /// Length declared by the sender.
        declared: usize,
        /// Accepted maximum.
        max: usize,
    },

    /// The body ended before the declared field was complete.
    #[error("field needs {needed} bytes but only {remaining} remain")]
    Truncated {
        /// Bytes the field requires.
        needed: usize,
        /// Bytes left in the body.
        remaining: usize,
    },

    /// Bytes remained after all declared fields were read.
    #[error("{remaining} unexpected trailing bytes after request fields")]
    TrailingBytes {
        /// Number of unread bytes.
        remaining: usize,
    },

    /// A string field was not valid UTF-8.
    #[error("string field is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    /// An address field had an unknown family or a mismatched length.
    #[error("invalid address: family {family} with {len} bytes")]
    InvalidAddress {
        /// Address family sent.
        family: i32,
        /// Address length sent.
        len: usize,
    },

    /// A response carried a status code outside the enumeration.
    #[error("unknown response status {code}")]
    UnknownStatus {
        /// Raw status value.
        code: i32,
    },

    /// A response carried neither an entry marker nor the end marker.
    #[error("unexpected result marker {marker}")]
    UnexpectedMarker {
        /// Raw marker value.
        marker: i32,
    },
}

impl FrameError {
    /// Returns `true` when the sender declared more data than allowed.
    #[must_use]
    pub const fn is_oversized(&self) -> bool {
        matches!(
            self,
            Self::RequestTooLarge { .. } | Self::FieldTooLarge { .. }
        )
    }

    /// Returns `true` when the channel can no longer carry frames.
    #[must_use]
    pub const fn is_channel_failure(&self) -> bool {
        matches!(self, Self::Io(_) | Self::UnexpectedEof)
    }
}
