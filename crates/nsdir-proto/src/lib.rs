//! Wire contract between the nsdir daemon and its lookup clients.
//!
//! Every exchange on a client channel is one request frame followed by one
//! response frame. All integers are big-endian.
//!
//! ```text
//! request:  i32 version | i32 request code | u32 body length | body
//! response: i32 version | i32 request code | i32 status
//!           { i32 RESULT_BEGIN | u32 entry length | entry }*
//!           i32 RESULT_END
//! ```
//!
//! Request bodies carry the key fields for the request code: strings are a
//! `u32` length followed by UTF-8 bytes, integers are `i32`, addresses are an
//! `i32` family followed by a length-prefixed address. Readers enforce
//! [`MAX_REQUEST_BYTES`] on the body and [`MAX_FIELD_BYTES`] on every string
//! before allocating.
//!
//! Request code values are part of the stable contract: new lookup
//! categories may be added, but existing numeric values never change.

mod error;
mod fields;
mod header;
mod request_code;
mod response;
mod status;

pub use error::FrameError;
pub use fields::{FieldReader, FieldWriter};
pub use header::{RequestHeader, discard_body, encode_request, read_body};
pub use request_code::{Database, KeyKind, RequestCode};
pub use response::{Attribute, Entry, Response};
pub use status::ResponseStatus;

/// Protocol version written in every frame header.
pub const PROTOCOL_VERSION: i32 = 2;

/// Marker preceding each result entry in a response.
pub const RESULT_BEGIN: i32 = 1;

/// Marker terminating the result entries of a response.
pub const RESULT_END: i32 = 2;

/// Largest request body the daemon accepts.
pub const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// Largest string field a client may send.
pub const MAX_FIELD_BYTES: usize = 1024;

/// Largest single result entry a client accepts when decoding responses.
pub const MAX_ENTRY_BYTES: usize = 1024 * 1024;

/// Address family value for IPv4 addresses (`AF_INET`).
pub const AF_INET: i32 = 2;

/// Address family value for IPv6 addresses (`AF_INET6`).
pub const AF_INET6: i32 = 10;
