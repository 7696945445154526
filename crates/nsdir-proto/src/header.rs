//! Request frame headers and bounded body reads.

use std::io::{self, Read};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{FrameError, MAX_REQUEST_BYTES, PROTOCOL_VERSION, RequestCode};

/// Fixed-size prefix of every request frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    /// Protocol version sent by the client.
    pub version: i32,
    /// Raw request code; may be unknown to this daemon.
    pub code: i32,
    /// Declared body length in bytes.
    pub body_len: u32,
}

impl RequestHeader {
    /// Encoded size of the header.
    pub const LEN: usize = 12;

    /// Header for a request of the current protocol version.
    #[must_use]
    pub const fn new(code: RequestCode, body_len: u32) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            code: code.code(),
            body_len,
        }
    }

    /// Reads a header from the channel.
    ///
    /// Returns `Ok(None)` when the channel ends cleanly before the first
    /// header byte.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::UnexpectedEof`] when the channel ends inside the
    /// header and [`FrameError::Io`] for read failures.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Option<Self>, FrameError> {
        let mut raw = [0_u8; Self::LEN];
        match fill(reader, &mut raw)? {
            0 => return Ok(None),
            Self::LEN => {}
            _ => return Err(FrameError::UnexpectedEof),
        }
        let mut cursor = raw.as_slice();
        Ok(Some(Self {
            version: cursor.get_i32(),
            code: cursor.get_i32(),
            body_len: cursor.get_u32(),
        }))
    }

    /// Appends the encoded header.
    pub fn encode(&self, out: &mut BytesMut) {
        out.put_i32(self.version);
        out.put_i32(self.code);
        out.put_u32(self.body_len);
    }

    /// Known request code, if any.
    #[must_use]
    pub const fn request_code(&self) -> Option<RequestCode> {
        RequestCode::from_code(self.code)
    }

    /// Checks the protocol version.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::UnsupportedVersion`] for any other version.
    pub const fn check_version(&self) -> Result<(), FrameError> {
        if self.version == PROTOCOL_VERSION {
            Ok(())
        } else {
            Err(FrameError::UnsupportedVersion {
                found: self.version,
            })
        }
    }

    /// Declared body length, checked against [`MAX_REQUEST_BYTES`].
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::RequestTooLarge`] when the declared length
    /// exceeds the limit.
    pub fn body_len(&self) -> Result<usize, FrameError> {
        let declared = usize::try_from(self.body_len).unwrap_or(usize::MAX);
        if declared > MAX_REQUEST_BYTES {
            return Err(FrameError::RequestTooLarge {
                declared,
                max: MAX_REQUEST_BYTES,
            });
        }
        Ok(declared)
    }
}

/// Reads the body announced by `header`.
///
/// The declared length is checked before any buffer is allocated.
///
/// # Errors
///
/// Returns [`FrameError::RequestTooLarge`] for oversized bodies (nothing is
/// consumed from the channel), [`FrameError::UnexpectedEof`] when the channel
/// ends early, and [`FrameError::Io`] for read failures.
pub fn read_body<R: Read>(reader: &mut R, header: &RequestHeader) -> Result<Bytes, FrameError> {
    let len = header.body_len()?;
    let mut body = vec![0_u8; len];
    if fill(reader, &mut body)? != len {
        return Err(FrameError::UnexpectedEof);
    }
    Ok(Bytes::from(body))
}

/// Consumes and drops `len` bytes from the channel without buffering them.
///
/// Used to skip the body of a rejected request so the next frame starts at
/// the right offset.
///
/// # Errors
///
/// Returns [`FrameError::UnexpectedEof`] when the channel ends first.
pub fn discard_body<R: Read>(reader: &mut R, len: u32) -> Result<(), FrameError> {
    let expected = u64::from(len);
    let copied = io::copy(&mut reader.take(expected), &mut io::sink())?;
    if copied == expected {
        Ok(())
    } else {
        Err(FrameError::UnexpectedEof)
    }
}

/// Encodes a complete request frame.
///
/// # Errors
///
/// Returns [`FrameError::RequestTooLarge`] when `body` exceeds
/// [`MAX_REQUEST_BYTES`].
pub fn encode_request(code: RequestCode, body: &[u8]) -> Result<Bytes, FrameError> {
    if body.len() > MAX_REQUEST_BYTES {
        return Err(FrameError::RequestTooLarge {
            declared: body.len(),
            max: MAX_REQUEST_BYTES,
        });
    }
    let body_len = u32::try_from(body.len()).map_err(|_| FrameError::RequestTooLarge {
        declared: body.len(),
        max: MAX_REQUEST_BYTES,
    })?;
    let mut out = BytesMut::with_capacity(RequestHeader::LEN + body.len());
    RequestHeader::new(code, body_len).encode(&mut out);
    out.put_slice(body);
    Ok(out.freeze())
}

/// Reads until `buf` is full or the channel ends, retrying on interrupts.
///
/// Returns the number of bytes read; less than `buf.len()` means the channel
/// ended.
pub(crate) fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, FrameError> {
    let mut filled = 0;
    while let Some(rest) = buf.get_mut(filled..) {
        if rest.is_empty() {
            break;
        }
        match reader.read(rest) {
            Ok(0) => break,
            Ok(read) => filled += read,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(FrameError::Io(error)),
        }
    }
    Ok(filled)
}
