//! Programmable resolver double whose answers can change between passes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::discovery::{ResolverError, ServiceRecord, SrvResolver};

#[derive(Debug, Default)]
struct Answers {
    default_domain: Option<String>,
    records: HashMap<String, Result<Vec<ServiceRecord>, ResolverError>>,
    queries: Vec<String>,
}

/// Resolver answering from scripted tables.
///
/// Clones share state, so a scenario can change answers after the daemon
/// took ownership of its copy. Names without a scripted answer report no
/// records.
#[derive(Debug, Clone, Default)]
pub struct ScriptedResolver {
    answers: Arc<Mutex<Answers>>,
}

impl ScriptedResolver {
    fn answers(&self) -> MutexGuard<'_, Answers> {
        self.answers.lock().expect("resolver mutex poisoned")
    }

    /// Sets the default domain reported by the host.
    pub fn set_default_domain(&self, domain: Option<&str>) {
        self.answers().default_domain = domain.map(str::to_owned);
    }

    /// Scripts the SRV answer for `name`.
    pub fn answer(&self, name: &str, records: Vec<ServiceRecord>) {
        self.answers().records.insert(name.to_owned(), Ok(records));
    }

    /// Scripts a failure for `name`.
    pub fn fail(&self, name: &str, error: ResolverError) {
        self.answers().records.insert(name.to_owned(), Err(error));
    }

    /// Names queried so far, in order.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.answers().queries.clone()
    }
}

impl SrvResolver for ScriptedResolver {
    fn default_domain(&self) -> Result<Option<String>, ResolverError> {
        Ok(self.answers().default_domain.clone())
    }

    fn query_service_records(&self, name: &str) -> Result<Vec<ServiceRecord>, ResolverError> {
        let mut answers = self.answers();
        answers.queries.push(name.to_owned());
        answers.records.get(name).cloned().unwrap_or_else(|| {
            Err(ResolverError::NoRecords {
                name: name.to_owned(),
            })
        })
    }
}
