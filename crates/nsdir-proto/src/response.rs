//! Response frames and the result entries they carry.

use std::io::Read;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::header::fill;
use crate::{
    FieldReader, FieldWriter, FrameError, MAX_ENTRY_BYTES, PROTOCOL_VERSION, RESULT_BEGIN,
    RESULT_END, ResponseStatus,
};

/// One named attribute of a result entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name as reported by the directory.
    pub name: String,
    /// Attribute values in directory order.
    pub values: Vec<String>,
}

/// One result record.
///
/// The daemon forwards entries as attribute lists; turning them into
/// database-specific structures is the client's concern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    /// Attributes in directory order.
    pub attributes: Vec<Attribute>,
}

impl Entry {
    /// Creates an entry without attributes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute, builder style.
    #[must_use]
    pub fn with_attribute<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.push(Attribute {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// First attribute with the given name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
    }

    fn encode(&self) -> Result<Bytes, FrameError> {
        let mut body = FieldWriter::new();
        body.put_u32(count(self.attributes.len())?);
        for attribute in &self.attributes {
            body.put_string(&attribute.name)?
                .put_u32(count(attribute.values.len())?);
            for value in &attribute.values {
                body.put_string(value)?;
            }
        }
        Ok(body.into_bytes())
    }

    fn decode(body: Bytes) -> Result<Self, FrameError> {
        let mut reader = FieldReader::with_field_limit(body, MAX_ENTRY_BYTES);
        let attribute_count = reader.read_u32()?;
        let mut attributes = Vec::new();
        for _ in 0..attribute_count {
            let name = reader.read_string()?;
            let value_count = reader.read_u32()?;
            let mut values = Vec::new();
            for _ in 0..value_count {
                values.push(reader.read_string()?);
            }
            attributes.push(Attribute { name, values });
        }
        reader.finish()?;
        Ok(Self { attributes })
    }
}

/// A complete response frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Request code echoed from the request, raw so unknown codes round-trip.
    pub code: i32,
    /// Outcome of the request.
    pub status: ResponseStatus,
    /// Result entries; empty unless the status is a success.
    pub entries: Vec<Entry>,
}

impl Response {
    /// Response carrying only a status.
    #[must_use]
    pub const fn status_only(code: i32, status: ResponseStatus) -> Self {
        Self {
            code,
            status,
            entries: Vec::new(),
        }
    }

    /// Response carrying entries.
    #[must_use]
    pub const fn with_entries(code: i32, status: ResponseStatus, entries: Vec<Entry>) -> Self {
        Self {
            code,
            status,
            entries,
        }
    }

    /// Encodes the full frame, terminator included.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::FieldTooLarge`] when an entry is larger than
    /// [`MAX_ENTRY_BYTES`], the limit every reader enforces.
    pub fn encode(&self) -> Result<Bytes, FrameError> {
        let mut out = BytesMut::new();
        out.put_i32(PROTOCOL_VERSION);
        out.put_i32(self.code);
        out.put_i32(self.status.code());
        for entry in &self.entries {
            let body = entry.encode()?;
            if body.len() > MAX_ENTRY_BYTES {
                return Err(FrameError::FieldTooLarge {
                    declared: body.len(),
                    max: MAX_ENTRY_BYTES,
                });
            }
            out.put_i32(RESULT_BEGIN);
            out.put_u32(count(body.len())?);
            out.put_slice(&body);
        }
        out.put_i32(RESULT_END);
        Ok(out.freeze())
    }

    /// Reads one response frame from the channel.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::UnexpectedEof`] when the channel ends inside the
    /// frame, [`FrameError::FieldTooLarge`] for entries over
    /// [`MAX_ENTRY_BYTES`], and decoding errors for malformed content.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, FrameError> {
        let version = read_i32(reader)?;
        if version != PROTOCOL_VERSION {
            return Err(FrameError::UnsupportedVersion { found: version });
        }
        let code = read_i32(reader)?;
        let raw_status = read_i32(reader)?;
        let status = ResponseStatus::from_code(raw_status)
            .ok_or(FrameError::UnknownStatus { code: raw_status })?;

        let mut entries = Vec::new();
        loop {
            match read_i32(reader)? {
                RESULT_END => break,
                RESULT_BEGIN => {
                    let declared = usize::try_from(read_u32(reader)?).unwrap_or(usize::MAX);
                    if declared > MAX_ENTRY_BYTES {
                        return Err(FrameError::FieldTooLarge {
                            declared,
                            max: MAX_ENTRY_BYTES,
                        });
                    }
                    let mut body = vec![0_u8; declared];
                    if fill(reader, &mut body)? != declared {
                        return Err(FrameError::UnexpectedEof);
                    }
                    entries.push(Entry::decode(Bytes::from(body))?);
                }
                marker => return Err(FrameError::UnexpectedMarker { marker }),
            }
        }

        Ok(Self {
            code,
            status,
            entries,
        })
    }
}

fn count(len: usize) -> Result<u32, FrameError> {
    u32::try_from(len).map_err(|_| FrameError::FieldTooLarge {
        declared: len,
        max: usize::try_from(u32::MAX).unwrap_or(usize::MAX),
    })
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32, FrameError> {
    let mut raw = [0_u8; 4];
    if fill(reader, &mut raw)? != raw.len() {
        return Err(FrameError::UnexpectedEof);
    }
    Ok(raw.as_slice().get_i32())
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, FrameError> {
    let mut raw = [0_u8; 4];
    if fill(reader, &mut raw)? != raw.len() {
        return Err(FrameError::UnexpectedEof);
    }
    Ok(raw.as_slice().get_u32())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn passwd_entry() -> Entry {
        Entry::new()
            .with_attribute("uid", ["alice"])
            .with_attribute("uidNumber", ["1000"])
            .with_attribute("memberOf", ["staff", "wheel"])
    }

    #[test]
    fn response_with_entries_is_read_back() -> Result<(), FrameError> {
        let response = Response::with_entries(
            1001,
            ResponseStatus::Success,
            vec![passwd_entry(), Entry::new()],
        );
        let encoded = response.encode()?;
        let decoded = Response::read_from(&mut Cursor::new(encoded.to_vec()))?;
        assert_eq!(decoded, response);
        Ok(())
    }

    #[test]
    fn entries_over_the_reader_limit_are_not_encoded() {
        let huge = "x".repeat(MAX_ENTRY_BYTES);
        let response = Response::with_entries(
            1001,
            ResponseStatus::Success,
            vec![Entry::new().with_attribute("description", [huge])],
        );
        assert!(matches!(
            response.encode(),
            Err(FrameError::FieldTooLarge {
                max: MAX_ENTRY_BYTES,
                ..
            })
        ));
    }

    #[test]
    fn status_only_response_is_terminated() -> Result<(), FrameError> {
        let encoded = Response::status_only(77, ResponseStatus::UnknownRequest).encode()?;
        assert_eq!(encoded.len(), 16);
        let mut tail = encoded.slice(12..);
        assert_eq!(tail.get_i32(), RESULT_END);
        Ok(())
    }

    #[test]
    fn truncated_response_is_unexpected_eof() -> Result<(), FrameError> {
        let encoded = Response::with_entries(1001, ResponseStatus::Success, vec![passwd_entry()])
            .encode()?;
        let cut = encoded.slice(..encoded.len() - 6);
        assert!(matches!(
            Response::read_from(&mut Cursor::new(cut.to_vec())),
            Err(FrameError::UnexpectedEof)
        ));
        Ok(())
    }

    #[test]
    fn unknown_marker_is_rejected() {
        let mut raw = BytesMut::new();
        raw.put_i32(PROTOCOL_VERSION);
        raw.put_i32(1001);
        raw.put_i32(0);
        raw.put_i32(9);
        assert!(matches!(
            Response::read_from(&mut Cursor::new(raw.to_vec())),
            Err(FrameError::UnexpectedMarker { marker: 9 })
        ));
    }

    #[test]
    fn entry_lookup_by_attribute_name() {
        let entry = passwd_entry();
        let member_of = entry.attribute("memberOf").map(|a| a.values.clone());
        assert_eq!(member_of, Some(vec!["staff".to_owned(), "wheel".to_owned()]));
        assert!(entry.attribute("shadowLastChange").is_none());
    }
}
