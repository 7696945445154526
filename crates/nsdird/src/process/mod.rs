//! Process lifecycle: launch sequencing and signal handling.

mod errors;
pub(crate) mod launch;
pub(crate) mod signals;

pub use errors::LaunchError;
pub use launch::run_daemon;
pub use signals::{ProcessSignal, SignalError, SignalSource, SystemSignals};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
