//! Test suites for the nsdir daemon.

mod dispatch_behaviour;
mod support;
