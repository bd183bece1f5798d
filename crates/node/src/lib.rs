//! Chord node: runs a set of ring members in one process.
//! --------------
//! - [Config](crate::config::Config) is read from yaml: ring width, intervals of the periodic steps and
//!   the identities of the members.
//! - [Processor](crate::processor::Processor) builds the ring from the config and runs, per member, one
//!   stabilize task and one fix-fingers task on tokio.
//! - [init_logging](crate::logging::init_logging) installs a `tracing` subscriber writing to stderr.
pub mod config;
pub mod consts;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod processor;
pub mod util;
