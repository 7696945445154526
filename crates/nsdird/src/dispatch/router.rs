//! Request code routing.
//!
//! The dispatch table maps every known request code to its lookup handler.
//! Routing happens after the header is read and before the body is: a
//! request that cannot be served has its body drained so the channel stays
//! aligned on frame boundaries.

use std::collections::HashMap;
use std::io::Read;

use tracing::debug;

use nsdir_config::DirectoryConfig;
use nsdir_proto::{
    FieldReader, RequestCode, RequestHeader, Response, ResponseStatus, discard_body, read_body,
};

use super::directory::DirectoryClient;
use super::errors::DispatchError;
use super::request::{LookupKey, SearchRequest};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Serves one request code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupHandler {
    code: RequestCode,
}

impl LookupHandler {
    /// Creates the handler for `code`.
    pub fn new(code: RequestCode) -> Self {
        Self { code }
    }

    /// Request code this handler serves.
    pub fn code(&self) -> RequestCode {
        self.code
    }

    /// Decodes the key, searches the directory, and builds the response.
    ///
    /// Keyed lookups without matches report [`ResponseStatus::NotFound`];
    /// an empty enumeration is still a success.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Malformed`] when the body does not hold
    /// exactly the key fields, and directory errors otherwise.
    pub fn handle(
        &self,
        mut body: FieldReader,
        directory: &DirectoryConfig,
        client: &dyn DirectoryClient,
    ) -> Result<Response, DispatchError> {
        let key = LookupKey::read(self.code.key(), &mut body).map_err(DispatchError::from_frame)?;
        body.finish().map_err(DispatchError::from_frame)?;

        let request = SearchRequest::new(self.code, key);
        let entries = client.search(directory, &request)?;
        debug!(
            target: DISPATCH_TARGET,
            request = self.code.name(),
            key = %request.key(),
            entries = entries.len(),
            "lookup answered"
        );

        let status = if entries.is_empty() && !request.key().is_enumeration() {
            ResponseStatus::NotFound
        } else {
            ResponseStatus::Success
        };
        Ok(Response::with_entries(self.code.code(), status, entries))
    }
}

/// Static mapping from request code to handler.
#[derive(Debug, Clone)]
pub struct DispatchTable {
    handlers: HashMap<i32, LookupHandler>,
}

impl DispatchTable {
    /// Table with one handler for every defined request code.
    pub fn standard() -> Self {
        let handlers = RequestCode::ALL
            .iter()
            .map(|code| (code.code(), LookupHandler::new(*code)))
            .collect();
        Self { handlers }
    }

    /// Handler registered for a raw code.
    pub fn lookup(&self, code: i32) -> Option<&LookupHandler> {
        self.handlers.get(&code)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` when no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Reads the body announced by `header` and routes the request.
    ///
    /// Rejected requests have their body discarded before the error is
    /// returned. Oversized bodies are never buffered.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] whose status is sent back to the client.
    /// Channel failures are reported through
    /// [`DispatchError::is_channel_failure`].
    pub fn dispatch<R: Read>(
        &self,
        header: &RequestHeader,
        reader: &mut R,
        directory: &DirectoryConfig,
        client: &dyn DirectoryClient,
    ) -> Result<Response, DispatchError> {
        if let Err(error) = header.check_version() {
            return Err(reject(reader, header, DispatchError::from_frame(error)));
        }
        if let Err(error) = header.body_len() {
            return Err(reject(reader, header, DispatchError::from_frame(error)));
        }
        let Some(handler) = self.lookup(header.code) else {
            return Err(reject(
                reader,
                header,
                DispatchError::unknown_request(header.code),
            ));
        };

        let body = read_body(reader, header).map_err(DispatchError::from_frame)?;
        handler.handle(FieldReader::new(body), directory, client)
    }
}

/// Drains the rejected body; a failed drain replaces `error`.
fn reject<R: Read>(reader: &mut R, header: &RequestHeader, error: DispatchError) -> DispatchError {
    match discard_body(reader, header.body_len) {
        Ok(()) => error,
        Err(drain) => DispatchError::from_frame(drain),
    }
}
