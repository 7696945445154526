use serde::{Deserialize, Serialize};

/// Connection parameters for the directory client.
///
/// A value starts from static configuration and is refined by discovery
/// passes. Each pass produces a new value; a value that has been handed to
/// readers is never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DirectoryConfig {
    srv_domain: Option<String>,
    base: Option<String>,
    uris: Vec<String>,
}

impl DirectoryConfig {
    /// Builds a configuration from its parts.
    #[must_use]
    pub fn new(srv_domain: Option<String>, base: Option<String>, uris: Vec<String>) -> Self {
        Self {
            srv_domain,
            base,
            uris,
        }
    }

    /// Explicit SRV query name, if configured.
    #[must_use]
    pub fn srv_domain(&self) -> Option<&str> {
        self.srv_domain.as_deref()
    }

    /// Search base DN, if configured or derived.
    #[must_use]
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Server URIs in the order they were configured or discovered.
    #[must_use]
    pub fn uris(&self) -> &[String] {
        &self.uris
    }

    /// Appends a server URI. Duplicates are kept.
    pub fn push_uri(&mut self, uri: String) {
        self.uris.push(uri);
    }

    /// Sets the base DN unless one is already present.
    ///
    /// Returns `false` and leaves the existing value untouched when a base DN
    /// was already determined.
    pub fn set_base_if_absent(&mut self, base: String) -> bool {
        if self.base.is_some() {
            return false;
        }
        self.base = Some(base);
        true
    }
}
