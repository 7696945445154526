//! Length-checked field access for frame bodies.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{AF_INET, AF_INET6, FrameError, MAX_FIELD_BYTES};

const ETHER_LEN: usize = 6;
const IPV4_LEN: usize = 4;
const IPV6_LEN: usize = 16;

/// Sequential reader over a frame body.
///
/// Every read checks the remaining length first, and every length prefix is
/// compared against the field limit before any bytes are copied.
#[derive(Debug, Clone)]
pub struct FieldReader {
    body: Bytes,
    field_limit: usize,
}

impl FieldReader {
    /// Reader for a client request body, limited to [`MAX_FIELD_BYTES`] per
    /// string.
    #[must_use]
    pub const fn new(body: Bytes) -> Self {
        Self::with_field_limit(body, MAX_FIELD_BYTES)
    }

    /// Reader with a custom per-string limit.
    #[must_use]
    pub const fn with_field_limit(body: Bytes, field_limit: usize) -> Self {
        Self { body, field_limit }
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.body.remaining()
    }

    /// Reads a big-endian `i32`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Truncated`] when fewer than four bytes remain.
    pub fn read_i32(&mut self) -> Result<i32, FrameError> {
        self.need(4)?;
        Ok(self.body.get_i32())
    }

    /// Reads a big-endian `u32`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Truncated`] when fewer than four bytes remain.
    pub fn read_u32(&mut self) -> Result<u32, FrameError> {
        self.need(4)?;
        Ok(self.body.get_u32())
    }

    /// Reads a length-prefixed UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::FieldTooLarge`] when the declared length exceeds
    /// the field limit, [`FrameError::Truncated`] when the body is shorter
    /// than declared, and [`FrameError::InvalidUtf8`] for invalid text.
    pub fn read_string(&mut self) -> Result<String, FrameError> {
        let declared = self.read_len()?;
        if declared > self.field_limit {
            return Err(FrameError::FieldTooLarge {
                declared,
                max: self.field_limit,
            });
        }
        self.need(declared)?;
        let raw = self.body.split_to(declared);
        Ok(String::from_utf8(raw.to_vec())?)
    }

    /// Reads an address as an `i32` family and a length-prefixed byte string.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::InvalidAddress`] when the family is unknown or
    /// the length does not match it.
    pub fn read_address(&mut self) -> Result<IpAddr, FrameError> {
        let family = self.read_i32()?;
        let len = self.read_len()?;
        match (family, len) {
            (AF_INET, IPV4_LEN) => {
                let mut octets = [0_u8; IPV4_LEN];
                self.copy_into(&mut octets)?;
                Ok(IpAddr::V4(Ipv4Addr::from(octets)))
            }
            (AF_INET6, IPV6_LEN) => {
                let mut octets = [0_u8; IPV6_LEN];
                self.copy_into(&mut octets)?;
                Ok(IpAddr::V6(Ipv6Addr::from(octets)))
            }
            _ => Err(FrameError::InvalidAddress { family, len }),
        }
    }

    /// Reads a six byte Ethernet address.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Truncated`] when fewer than six bytes remain.
    pub fn read_ether(&mut self) -> Result<[u8; ETHER_LEN], FrameError> {
        let mut ether = [0_u8; ETHER_LEN];
        self.copy_into(&mut ether)?;
        Ok(ether)
    }

    /// Confirms every byte of the body was consumed.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::TrailingBytes`] when unread bytes remain.
    pub fn finish(self) -> Result<(), FrameError> {
        match self.body.remaining() {
            0 => Ok(()),
            remaining => Err(FrameError::TrailingBytes { remaining }),
        }
    }

    fn read_len(&mut self) -> Result<usize, FrameError> {
        let raw = self.read_u32()?;
        usize::try_from(raw).map_err(|_| FrameError::FieldTooLarge {
            declared: usize::MAX,
            max: self.field_limit,
        })
    }

    fn copy_into(&mut self, target: &mut [u8]) -> Result<(), FrameError> {
        self.need(target.len())?;
        self.body.copy_to_slice(target);
        Ok(())
    }

    fn need(&self, needed: usize) -> Result<(), FrameError> {
        let remaining = self.body.remaining();
        if needed > remaining {
            return Err(FrameError::Truncated { needed, remaining });
        }
        Ok(())
    }
}

/// Builder for frame bodies using the same field encodings.
#[derive(Debug, Default)]
pub struct FieldWriter {
    buf: BytesMut,
}

impl FieldWriter {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a big-endian `i32`.
    pub fn put_i32(&mut self, value: i32) -> &mut Self {
        self.buf.put_i32(value);
        self
    }

    /// Appends a big-endian `u32`.
    pub fn put_u32(&mut self, value: u32) -> &mut Self {
        self.buf.put_u32(value);
        self
    }

    /// Appends a length-prefixed UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::FieldTooLarge`] when the string length does not
    /// fit the `u32` prefix.
    pub fn put_string(&mut self, value: &str) -> Result<&mut Self, FrameError> {
        let len = u32::try_from(value.len()).map_err(|_| FrameError::FieldTooLarge {
            declared: value.len(),
            max: usize::try_from(u32::MAX).unwrap_or(usize::MAX),
        })?;
        self.buf.put_u32(len);
        self.buf.put_slice(value.as_bytes());
        Ok(self)
    }

    /// Appends an address with its family and length prefix.
    pub fn put_address(&mut self, address: IpAddr) -> &mut Self {
        match address {
            IpAddr::V4(v4) => {
                self.buf.put_i32(AF_INET);
                self.buf.put_u32(4);
                self.buf.put_slice(&v4.octets());
            }
            IpAddr::V6(v6) => {
                self.buf.put_i32(AF_INET6);
                self.buf.put_u32(16);
                self.buf.put_slice(&v6.octets());
            }
        }
        self
    }

    /// Appends a six byte Ethernet address.
    pub fn put_ether(&mut self, ether: [u8; ETHER_LEN]) -> &mut Self {
        self.buf.put_slice(&ether);
        self
    }

    /// Appends raw bytes without a prefix.
    pub fn put_raw(&mut self, raw: &[u8]) -> &mut Self {
        self.buf.put_slice(raw);
        self
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` when nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Finishes the body.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}
