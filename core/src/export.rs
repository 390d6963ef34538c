//! # Host/Service Table
//!
//! Merges decoded reports into one row per (host, port), keyed and ordered by the
//! host's IPv4 address.
//!
//! A host seen again at the same address replaces the earlier one completely, ports
//! included. Reports must therefore be merged in a deterministic order.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use std::net::Ipv4Addr;

use nmapcsv_common::scan::{Host, ScanResult};
use tracing::debug;

pub const HEADER: [&str; 7] = ["IPv4", "hostname", "service", "port", "proto", "state", "product"];
pub const DELIMITER: &str = ",";

/// Ordering key for IPv4 addresses.
///
/// Valid dotted quads compare numerically. Anything else sorts after them, as text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AddressKey {
    Parsed(Ipv4Addr),
    Literal(String),
}

impl AddressKey {
    pub fn new(addr: &str) -> Self {
        match addr.trim().parse::<Ipv4Addr>() {
            Ok(ip) => Self::Parsed(ip),
            Err(_) => Self::Literal(addr.to_owned()),
        }
    }
}

impl fmt::Display for AddressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsed(ip) => write!(f, "{ip}"),
            Self::Literal(addr) => f.write_str(addr),
        }
    }
}

/// Every known host, deduplicated by IPv4 address.
#[derive(Debug, Default)]
pub struct HostTable {
    hosts: BTreeMap<AddressKey, Host>,
}

impl HostTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the hosts of one report, replacing hosts already stored at the same address.
    ///
    /// Hosts without an IPv4 address are dropped. A host with several IPv4 addresses is
    /// stored under each of them.
    pub fn merge(&mut self, result: ScanResult) {
        for host in result.hosts {
            let keys: Vec<AddressKey> = host
                .ipv4_addresses()
                .map(|addr| AddressKey::new(&addr.addr))
                .collect();

            for key in keys {
                if let Some(previous) = self.hosts.insert(key.clone(), host.clone()) {
                    // TODO: make the conflict policy configurable instead of dropping the older host.
                    debug!(
                        "replacing host at {key}: {} port(s) discarded, {} port(s) kept",
                        previous.ports.len(),
                        host.ports.len()
                    );
                }
            }
        }
    }

    /// Number of distinct IPv4 addresses.
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn get(&self, addr: &str) -> Option<&Host> {
        self.hosts.get(&AddressKey::new(addr))
    }

    /// One row per port, hosts in address order, ports in document order.
    pub fn rows(&self) -> impl Iterator<Item = ServiceRow<'_>> {
        self.hosts.iter().flat_map(|(key, host)| {
            let hostname = host.primary_hostname();
            host.ports.iter().map(move |port| ServiceRow {
                ipv4: key,
                hostname,
                service: &port.service.name,
                port: port.portid,
                proto: &port.protocol,
                state: &port.state.state,
                product: &port.service.product,
            })
        })
    }

    /// Writes the header and every row; returns the number of rows written.
    pub fn write_csv<W: Write>(&self, mut out: W) -> io::Result<usize> {
        writeln!(out, "{}", HEADER.join(DELIMITER))?;
        let mut count = 0;
        for row in self.rows() {
            writeln!(out, "{row}")?;
            count += 1;
        }
        out.flush()?;
        Ok(count)
    }
}

/// A single (host, port) line of the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceRow<'a> {
    pub ipv4: &'a AddressKey,
    pub hostname: &'a str,
    pub service: &'a str,
    pub port: u16,
    pub proto: &'a str,
    pub state: &'a str,
    pub product: &'a str,
}

impl fmt::Display for ServiceRow<'_> {
    /// Values are written verbatim; a delimiter inside a value is not escaped.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{ip}{d}{host}{d}{service}{d}{port}{d}{proto}{d}{state}{d}{product}",
            ip = self.ipv4,
            host = self.hostname,
            service = self.service,
            port = self.port,
            proto = self.proto,
            state = self.state,
            product = self.product,
            d = DELIMITER,
        )
    }
}
