//! Connection handler that serves framed lookup requests.
//!
//! Each channel carries any number of requests, answered one at a time in
//! arrival order. Request-local failures are logged and answered with an
//! error status; the channel stays open. End-of-stream and channel failures
//! end the loop, after which the owner closes the channel.

use std::io::{Read, Write};
use std::sync::Arc;

use tracing::{debug, warn};

use nsdir_proto::{RequestHeader, Response, ResponseStatus};

use crate::discovery::PublishedConfig;
use crate::transport::{ConnectionHandler, ConnectionStream};

use super::directory::DirectoryClient;
use super::errors::DispatchError;
use super::response::ResponseWriter;
use super::router::{DISPATCH_TARGET, DispatchTable};

/// Connection handler backed by a dispatch table and a directory client.
pub struct DispatchConnectionHandler {
    table: DispatchTable,
    client: Arc<dyn DirectoryClient>,
    published: Arc<PublishedConfig>,
}

impl DispatchConnectionHandler {
    /// Creates a handler answering from the published configuration.
    pub fn new(
        table: DispatchTable,
        client: Arc<dyn DirectoryClient>,
        published: Arc<PublishedConfig>,
    ) -> Self {
        Self {
            table,
            client,
            published,
        }
    }

    /// Serves requests until end-of-stream or a channel failure.
    pub fn serve<S: Read + Write>(&self, stream: &mut S) {
        loop {
            let header = match RequestHeader::read_from(stream) {
                Ok(Some(header)) => header,
                Ok(None) => {
                    debug!(target: DISPATCH_TARGET, "client closed channel");
                    return;
                }
                Err(error) => {
                    warn!(target: DISPATCH_TARGET, %error, "error reading from client");
                    return;
                }
            };

            let directory = self.published.load();
            let response = match self.table.dispatch(
                &header,
                stream,
                &directory,
                self.client.as_ref(),
            ) {
                Ok(response) => response,
                Err(error) if error.is_channel_failure() => {
                    warn!(target: DISPATCH_TARGET, %error, "error reading from client");
                    return;
                }
                Err(error) => {
                    log_rejection(header.code, &error);
                    Response::status_only(header.code, error.status())
                }
            };

            if !answer(&mut *stream, header.code, &response) {
                return;
            }
        }
    }
}

/// Writes `response`, replacing it with an internal-error status when it
/// cannot be framed. Returns `false` once the channel is unusable.
fn answer<W: Write>(stream: &mut W, code: i32, response: &Response) -> bool {
    let mut writer = ResponseWriter::new(stream);
    let failure = match writer.write_response(response) {
        Ok(()) => return true,
        Err(error) if error.is_channel_failure() => error,
        Err(error) => {
            warn!(target: DISPATCH_TARGET, code, %error, "response could not be framed");
            match writer.write_response(&Response::status_only(code, ResponseStatus::Internal)) {
                Ok(()) => return true,
                Err(error) => error,
            }
        }
    };
    warn!(target: DISPATCH_TARGET, error = %failure, "error writing to client");
    !failure.is_channel_failure()
}

fn log_rejection(code: i32, error: &DispatchError) {
    match error {
        DispatchError::ArgumentTooLarge { .. } => {
            warn!(target: DISPATCH_TARGET, code, %error, "client supplied argument too large");
        }
        DispatchError::UnknownRequest { .. } | DispatchError::Malformed { .. } => {
            warn!(target: DISPATCH_TARGET, code, %error, "rejected client request");
        }
        _ => {
            warn!(target: DISPATCH_TARGET, code, %error, "lookup failed");
        }
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, mut stream: ConnectionStream) {
        self.serve(&mut stream);
        if let Err(error) = stream.close() {
            debug!(target: DISPATCH_TARGET, %error, "channel already closed");
        }
    }
}
