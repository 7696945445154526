//! Test harness utilities shared by the daemon behavioural suites.

mod config_loader;
mod reporter;
mod resolver;
mod world;

pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use resolver::ScriptedResolver;
pub use world::{TestWorld, world};
