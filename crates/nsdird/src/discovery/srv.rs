//! Turns SRV answers into directory server URIs.

use tracing::debug;

use super::DISCOVERY_TARGET;
use super::buffer::BoundedBuffer;
use super::errors::DiscoveryError;
use super::resolver::{ServiceRecord, SrvResolver};

/// Port on which directory servers speak TLS from the first byte.
pub const LDAPS_PORT: u16 = 636;

/// SRV name under which directory servers of `domain` are published.
#[must_use]
pub fn service_query_name(domain: &str) -> String {
    format!("_ldap._tcp.{}.", domain.trim_end_matches('.'))
}

/// URI for one SRV answer.
#[must_use]
pub fn server_uri(record: &ServiceRecord) -> String {
    let scheme = if record.port == LDAPS_PORT {
        "ldaps"
    } else {
        "ldap"
    };
    format!("{scheme}:{}:{}", record.target, record.port)
}

/// Queries `name` and appends one URI per answer to `uris`.
///
/// Answers are used in the order the resolver returned them; priority and
/// weight are not applied. Each URI is committed to `buffer` before it is
/// pushed, and the first one that does not fit stops the walk. URIs pushed
/// before the overflow stay in `uris`.
///
/// # Errors
///
/// Returns [`DiscoveryError::NotFound`] for an empty answer,
/// [`DiscoveryError::Unavailable`] when the resolver cannot answer, and
/// [`DiscoveryError::Overflow`] when the buffer runs out.
pub fn discover_uris<R>(
    resolver: &R,
    name: &str,
    buffer: &mut BoundedBuffer,
    uris: &mut Vec<String>,
) -> Result<(), DiscoveryError>
where
    R: SrvResolver + ?Sized,
{
    let records = resolver.query_service_records(name)?;
    if records.is_empty() {
        return Err(DiscoveryError::not_found(format!(
            "no service records for {name}"
        )));
    }

    for record in &records {
        let uri = server_uri(record);
        buffer.try_append(&uri)?;
        let uri = buffer.take_pending();
        debug!(
            target: DISCOVERY_TARGET,
            uri = %uri,
            priority = record.priority,
            weight = record.weight,
            "discovered directory server"
        );
        uris.push(uri);
    }
    Ok(())
}
