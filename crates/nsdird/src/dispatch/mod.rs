//! Request dispatch for client channels.
//!
//! A channel carries a sequence of request frames. Each frame names a
//! request code; the [`DispatchTable`] maps that code to the
//! [`LookupHandler`] which reads the code's key fields, queries the
//! [`DirectoryClient`] with the currently published configuration, and
//! produces a [`nsdir_proto::Response`].
//!
//! ## Failure handling
//!
//! | Failure                       | Status              | Channel |
//! |-------------------------------|---------------------|---------|
//! | unknown request code          | `UnknownRequest`    | open    |
//! | oversized body or field       | `ProtocolViolation` | open    |
//! | malformed key fields          | `ProtocolViolation` | open    |
//! | directory unreachable         | `Unavailable`       | open    |
//! | result too large to frame     | `Internal`          | open    |
//! | read or write failure         | none                | closed  |
//! | end-of-stream                 | none                | closed  |

mod directory;
mod errors;
mod handler;
mod request;
mod response;
mod router;

pub use self::directory::{DirectoryClient, DirectoryError, UnconfiguredDirectory};
pub use self::errors::DispatchError;
pub use self::handler::DispatchConnectionHandler;
pub use self::request::{LookupKey, SearchRequest};
pub use self::response::ResponseWriter;
pub use self::router::{DispatchTable, LookupHandler};
