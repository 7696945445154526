//! DNS seam for service discovery.
//!
//! [`SrvResolver`] is the boundary the discovery pass talks to;
//! [`SystemResolver`] implements it with `trust-dns-resolver` over the host's
//! resolver configuration.

use std::fmt;

use thiserror::Error;
use trust_dns_resolver::Resolver;
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::proto::rr::Name;
use trust_dns_resolver::system_conf::read_system_conf;

/// One SRV answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    /// Lower values are preferred.
    pub priority: u16,
    /// Relative weight among records of equal priority.
    pub weight: u16,
    /// Service port.
    pub port: u16,
    /// Host name without the trailing root dot.
    pub target: String,
}

impl ServiceRecord {
    /// Builds a record.
    #[must_use]
    pub fn new(priority: u16, weight: u16, port: u16, target: impl Into<String>) -> Self {
        Self {
            priority,
            weight,
            port,
            target: target.into(),
        }
    }
}

/// Failures reported by a resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    /// The resolver could not be initialised or contacted.
    #[error("resolver unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },
    /// The name exists in no answer.
    #[error("no service records for {name}")]
    NoRecords {
        /// Queried name.
        name: String,
    },
    /// The query failed in transit.
    #[error("service record query for {name} failed: {message}")]
    Transport {
        /// Queried name.
        name: String,
        /// Description of the failure.
        message: String,
    },
}

/// Source of the default domain and of SRV answers.
pub trait SrvResolver {
    /// Default search domain of the host, if one is configured.
    fn default_domain(&self) -> Result<Option<String>, ResolverError>;

    /// Queries the SRV records published under `name`, in received order.
    fn query_service_records(&self, name: &str) -> Result<Vec<ServiceRecord>, ResolverError>;
}

impl<T> SrvResolver for &T
where
    T: SrvResolver + ?Sized,
{
    fn default_domain(&self) -> Result<Option<String>, ResolverError> {
        (**self).default_domain()
    }

    fn query_service_records(&self, name: &str) -> Result<Vec<ServiceRecord>, ResolverError> {
        (**self).query_service_records(name)
    }
}

/// Resolver backed by the host's `resolv.conf`.
///
/// Construction never fails: an initialisation error is kept and reported as
/// [`ResolverError::Unavailable`] by every call, so the daemon can start and
/// retry discovery later.
pub struct SystemResolver {
    state: Result<SystemState, String>,
    domain_override: Option<String>,
}

struct SystemState {
    resolver: Resolver,
    default_domain: Option<String>,
}

impl SystemResolver {
    /// Reads the system resolver configuration and builds a resolver from it.
    #[must_use]
    pub fn from_system_conf() -> Self {
        let state = read_system_conf()
            .map_err(|error| error.to_string())
            .and_then(|(config, options)| {
                let default_domain = config
                    .domain()
                    .or_else(|| config.search().first())
                    .map(relative_name);
                Resolver::new(config, options)
                    .map(|resolver| SystemState {
                        resolver,
                        default_domain,
                    })
                    .map_err(|error| error.to_string())
            });
        Self {
            state,
            domain_override: None,
        }
    }

    /// Replaces the default domain the system configuration reports.
    #[must_use]
    pub fn with_default_domain(mut self, domain: Option<String>) -> Self {
        self.domain_override = domain;
        self
    }

    fn state(&self) -> Result<&SystemState, ResolverError> {
        self.state
            .as_ref()
            .map_err(|message| ResolverError::Unavailable {
                message: message.clone(),
            })
    }
}

impl fmt::Debug for SystemResolver {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SystemResolver")
            .field("initialised", &self.state.is_ok())
            .field("domain_override", &self.domain_override)
            .finish()
    }
}

impl SrvResolver for SystemResolver {
    fn default_domain(&self) -> Result<Option<String>, ResolverError> {
        let state = self.state()?;
        Ok(self
            .domain_override
            .clone()
            .or_else(|| state.default_domain.clone()))
    }

    fn query_service_records(&self, name: &str) -> Result<Vec<ServiceRecord>, ResolverError> {
        let lookup = self
            .state()?
            .resolver
            .srv_lookup(name)
            .map_err(|error| query_error(name, &error))?;
        Ok(lookup
            .iter()
            .map(|srv| {
                ServiceRecord::new(
                    srv.priority(),
                    srv.weight(),
                    srv.port(),
                    relative_name(srv.target()),
                )
            })
            .collect())
    }
}

fn relative_name(name: &Name) -> String {
    name.to_utf8().trim_end_matches('.').to_owned()
}

fn query_error(name: &str, error: &ResolveError) -> ResolverError {
    match error.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => ResolverError::NoRecords {
            name: name.to_owned(),
        },
        _ => ResolverError::Transport {
            name: name.to_owned(),
            message: error.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed_resolver() -> SystemResolver {
        SystemResolver {
            state: Err("no nameservers".to_owned()),
            domain_override: Some("example.org".to_owned()),
        }
    }

    #[test]
    fn failed_initialisation_is_reported_on_every_call() {
        let resolver = failed_resolver();
        let unavailable = ResolverError::Unavailable {
            message: "no nameservers".to_owned(),
        };
        assert_eq!(resolver.default_domain(), Err(unavailable.clone()));
        assert_eq!(
            resolver.query_service_records("_ldap._tcp.example.org."),
            Err(unavailable)
        );
    }

    #[test]
    fn relative_name_drops_root_label() -> Result<(), Box<dyn std::error::Error>> {
        let name = Name::from_ascii("ldap1.example.org.")?;
        assert_eq!(relative_name(&name), "ldap1.example.org");
        Ok(())
    }

    #[test]
    fn debug_output_omits_resolver_internals() {
        let rendered = format!("{:?}", failed_resolver());
        assert!(rendered.contains("initialised: false"));
    }
}
