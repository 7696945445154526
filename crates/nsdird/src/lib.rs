//! The nsdir name-service lookup daemon.
//!
//! `nsdird` answers name-service lookups (users, groups, hosts, services and
//! the other classic databases) from a directory server. Clients connect
//! over a Unix or TCP socket and send framed requests defined by
//! [`nsdir_proto`]; each request is routed by its code to a lookup handler.
//!
//! Directory connection parameters come from [`nsdir_config`] and may be
//! refined at runtime by DNS service discovery: server URIs are found from
//! `_ldap._tcp` SRV records and a missing search base is derived from the
//! host's default domain. Discovery results are published atomically and a
//! failed pass never replaces a working configuration. Sending `SIGHUP`
//! re-runs discovery.
//!
//! Bootstrap stages are reported through [`HealthReporter`] so operators can
//! follow startup and reloads in the structured log.

mod bootstrap;
pub mod discovery;
pub mod dispatch;
mod health;
mod process;
mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{LaunchError, ProcessSignal, SignalError, SignalSource, SystemSignals, run_daemon};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
