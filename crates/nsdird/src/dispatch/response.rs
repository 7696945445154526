//! Response framing for the dispatch loop.

use std::io::Write;

use nsdir_proto::Response;

use super::errors::DispatchError;

/// Writes encoded response frames to a channel.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Wraps an output stream.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Encodes and writes one complete response, then flushes.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Encode`] when the response cannot be framed
    /// and [`DispatchError::Io`] when the write fails.
    pub fn write_response(&mut self, response: &Response) -> Result<(), DispatchError> {
        let frame = response.encode().map_err(DispatchError::encode)?;
        self.writer.write_all(&frame)?;
        self.writer.flush()?;
        Ok(())
    }
}
