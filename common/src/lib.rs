//! Types shared by every `nmapcsv` crate.
//!
//! * **[`scan`]**: the decoded scan-report model (hosts, ports, services, OS guesses).
//! * **[`config`]**: runtime options collected from the command line.
//! * **[`log`]**: logging macros layered over `tracing`.

pub mod config;
pub mod log;
pub mod scan;

#[doc(hidden)]
pub use tracing;
