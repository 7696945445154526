//! Directory server discovery.
//!
//! A discovery pass turns the static [`DirectoryConfig`] into a refined copy:
//! server URIs are looked up as DNS SRV records and, when no search base is
//! configured, one is derived from the host's default domain
//! (`example.org` becomes `DC=example,DC=org`). Everything a pass produces is
//! committed through a single [`BoundedBuffer`], so the output of one pass is
//! capped at the configured byte budget and a rejected write never leaves
//! partial text behind.
//!
//! Results are published through [`PublishedConfig`]. Request handlers read
//! immutable snapshots; a failed pass never replaces a working
//! configuration.
//!
//! SRV answers are used in the order the resolver returns them. Priority and
//! weight are carried on [`ServiceRecord`] but not applied.
//!
//! [`DirectoryConfig`]: nsdir_config::DirectoryConfig

mod buffer;
mod dn;
mod errors;
mod merge;
mod published;
mod resolver;
mod srv;

pub use buffer::{BoundedBuffer, Overflow};
pub use dn::{domain_to_dn, labels};
pub use errors::DiscoveryError;
pub use merge::DiscoveryPass;
pub use published::PublishedConfig;
pub use resolver::{ResolverError, ServiceRecord, SrvResolver, SystemResolver};
pub use srv::{LDAPS_PORT, discover_uris, server_uri, service_query_name};

pub(crate) const DISCOVERY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::discovery");
