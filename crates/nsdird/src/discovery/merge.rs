//! Combines SRV discovery and DN derivation into one pass.

use tracing::debug;

use nsdir_config::DirectoryConfig;

use super::DISCOVERY_TARGET;
use super::buffer::BoundedBuffer;
use super::dn::domain_to_dn;
use super::errors::DiscoveryError;
use super::resolver::SrvResolver;
use super::srv::{discover_uris, service_query_name};

/// One discovery run with its own byte budget.
///
/// A pass never mutates its input: [`DiscoveryPass::run`] clones the
/// configuration it is given and returns the refined copy, or an error and
/// nothing.
#[derive(Debug)]
pub struct DiscoveryPass<'r, R: ?Sized> {
    resolver: &'r R,
    capacity: usize,
}

impl<'r, R> DiscoveryPass<'r, R>
where
    R: SrvResolver + ?Sized,
{
    /// Creates a pass that may commit at most `capacity` bytes of output.
    pub fn new(resolver: &'r R, capacity: usize) -> Self {
        Self { resolver, capacity }
    }

    /// Byte budget of each run.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Discovers server URIs and, when no base DN is set, derives one.
    ///
    /// The SRV name is the configured one, or `_ldap._tcp.<default domain>.`.
    /// Discovered URIs are appended after the existing ones; duplicates are
    /// kept. A URI that does not fit the budget stops further appends but
    /// keeps those already made. A configured or previously derived base DN
    /// is never replaced; without a default domain the derived base is the
    /// empty DN.
    ///
    /// # Errors
    ///
    /// A lookup that finds nothing, or a missing default domain when the SRV
    /// name has to be synthesised, is [`DiscoveryError::NotFound`]. Resolver
    /// failures end the pass before DN derivation. A DN that does not fit the
    /// remaining budget fails the pass with [`DiscoveryError::Overflow`].
    pub fn run(&self, current: &DirectoryConfig) -> Result<DirectoryConfig, DiscoveryError> {
        let mut buffer = BoundedBuffer::with_capacity(self.capacity);
        let mut next = current.clone();

        let query = match current.srv_domain() {
            Some(name) => name.to_owned(),
            None => {
                let domain = self
                    .resolver
                    .default_domain()?
                    .ok_or_else(|| DiscoveryError::not_found("no default domain configured"))?;
                service_query_name(&domain)
            }
        };
        debug!(target: DISCOVERY_TARGET, query = %query, "querying directory servers");

        let mut discovered = Vec::new();
        match discover_uris(self.resolver, &query, &mut buffer, &mut discovered) {
            Ok(()) => {}
            Err(DiscoveryError::Overflow(overflow)) => {
                debug!(
                    target: DISCOVERY_TARGET,
                    kept = discovered.len(),
                    %overflow,
                    "server list truncated to the discovery budget"
                );
            }
            Err(error) => return Err(error),
        }
        for uri in discovered {
            next.push_uri(uri);
        }

        if next.base().is_none() {
            let domain = self.resolver.default_domain()?.unwrap_or_default();
            let base = domain_to_dn(&domain, &mut buffer)?;
            debug!(target: DISCOVERY_TARGET, base = %base, "derived search base");
            next.set_base_if_absent(base);
        }

        Ok(next)
    }
}
