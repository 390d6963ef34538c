//! # Scan Report Model
//!
//! Plain data decoded from nmap XML reports.
//!
//! Every field has a neutral default (empty string, zero, empty list or `None`), so a
//! report that leaves out optional attributes or blocks still produces a complete value.

pub mod host;
pub mod os;
pub mod port;

pub use host::{Address, Host, HostStatus, Hostname, ScanResult, Uptime};
pub use os::{Os, OsClass, OsMatch, PortUsed};
pub use port::{Port, PortState, Service};
