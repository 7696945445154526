//! The directory configuration request handlers read from.

use std::sync::Arc;

use arc_swap::ArcSwap;

use nsdir_config::DirectoryConfig;

use super::errors::DiscoveryError;
use super::merge::DiscoveryPass;
use super::resolver::SrvResolver;

/// Atomically replaceable snapshot of the directory configuration.
///
/// Readers take an `Arc` snapshot with [`PublishedConfig::load`] and keep
/// using it for the whole request. Every refresh starts from the static
/// baseline, so repeated reloads do not accumulate discovered URIs, and a
/// failed refresh leaves the previous snapshot in place.
#[derive(Debug)]
pub struct PublishedConfig {
    baseline: DirectoryConfig,
    current: ArcSwap<DirectoryConfig>,
}

impl PublishedConfig {
    /// Publishes the static configuration as the initial snapshot.
    #[must_use]
    pub fn new(baseline: DirectoryConfig) -> Self {
        let current = ArcSwap::from_pointee(baseline.clone());
        Self { baseline, current }
    }

    /// Current snapshot.
    #[must_use]
    pub fn load(&self) -> Arc<DirectoryConfig> {
        self.current.load_full()
    }

    /// Static configuration every refresh starts from.
    #[must_use]
    pub fn baseline(&self) -> &DirectoryConfig {
        &self.baseline
    }

    /// Runs `pass` against the baseline and publishes the result.
    ///
    /// # Errors
    ///
    /// Returns the pass's error; the published snapshot is unchanged.
    pub fn refresh<R>(&self, pass: &DiscoveryPass<'_, R>) -> Result<Arc<DirectoryConfig>, DiscoveryError>
    where
        R: SrvResolver + ?Sized,
    {
        let next = Arc::new(pass.run(&self.baseline)?);
        self.current.store(Arc::clone(&next));
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::test_support::MockResolver;
    use crate::discovery::{ResolverError, ServiceRecord};

    fn baseline() -> DirectoryConfig {
        DirectoryConfig::new(None, None, vec!["ldap:static.example.org:389".to_owned()])
    }

    fn answering_resolver() -> MockResolver {
        let mut resolver = MockResolver::new();
        resolver
            .expect_default_domain()
            .returning(|| Ok(Some("example.org".to_owned())));
        resolver.expect_query_service_records().returning(|_| {
            Ok(vec![ServiceRecord::new(0, 0, 389, "ldap.example.org")])
        });
        resolver
    }

    #[test]
    fn starts_with_the_baseline() {
        let published = PublishedConfig::new(baseline());
        assert_eq!(*published.load(), baseline());
    }

    #[test]
    fn successful_refresh_replaces_the_snapshot() {
        let published = PublishedConfig::new(baseline());
        let resolver = answering_resolver();
        let before = published.load();

        let refreshed = published.refresh(&DiscoveryPass::new(&resolver, 256));

        assert!(refreshed.is_ok());
        let after = published.load();
        assert_eq!(after.base(), Some("DC=example,DC=org"));
        assert_eq!(
            after.uris(),
            ["ldap:static.example.org:389", "ldap:ldap.example.org:389"]
        );
        assert_eq!(*before, baseline());
    }

    #[test]
    fn failed_refresh_keeps_previous_snapshot() {
        let published = PublishedConfig::new(baseline());
        let good = answering_resolver();
        assert!(published.refresh(&DiscoveryPass::new(&good, 256)).is_ok());
        let previous = published.load();

        let mut failing = MockResolver::new();
        failing.expect_default_domain().returning(|| {
            Err(ResolverError::Unavailable {
                message: "resolv.conf unreadable".to_owned(),
            })
        });
        let outcome = published.refresh(&DiscoveryPass::new(&failing, 256));

        assert!(matches!(outcome, Err(DiscoveryError::Unavailable { .. })));
        assert_eq!(published.load(), previous);
    }

    #[test]
    fn reloads_do_not_accumulate_uris() {
        let published = PublishedConfig::new(baseline());
        let resolver = answering_resolver();
        for _ in 0..3 {
            assert!(published.refresh(&DiscoveryPass::new(&resolver, 256)).is_ok());
        }
        assert_eq!(published.load().uris().len(), 2);
    }
}
