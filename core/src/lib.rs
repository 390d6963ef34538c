//! # nmapcsv core
//!
//! * **[`builder`]**: generic streaming decoders that build typed values from markup events.
//! * **[`nmap`]**: the decoders for nmap XML reports.
//! * **[`export`]**: merges decoded reports into the host/service table.
//! * **[`conversion`]**: the export use case, from input files to written table.
//! * **[`inputs`]**: resolves input files and directories.

pub mod builder;
pub mod conversion;
pub mod export;
pub mod inputs;
pub mod nmap;
