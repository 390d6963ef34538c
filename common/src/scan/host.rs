use super::os::Os;
use super::port::Port;

/// Address family tag nmap uses for IPv4 addresses.
pub const IPV4: &str = "ipv4";

/// One decoded report: the `<nmaprun>` root and all of its hosts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub scanner: String,
    pub args: String,
    pub version: String,
    pub hosts: Vec<Host>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Host {
    pub comment: String,
    pub status: Option<HostStatus>,
    pub hostnames: Vec<Hostname>,
    pub addresses: Vec<Address>,
    pub ports: Vec<Port>,
    pub os: Option<Os>,
    pub uptime: Option<Uptime>,
}

impl Host {
    /// Addresses of family `ipv4`, in document order.
    pub fn ipv4_addresses(&self) -> impl Iterator<Item = &Address> {
        self.addresses.iter().filter(|addr| addr.is_ipv4())
    }

    /// The first hostname, or `""` when the host has none.
    pub fn primary_hostname(&self) -> &str {
        self.hostnames
            .first()
            .map(|hostname| hostname.name.as_str())
            .unwrap_or_default()
    }
}

/// Contents of `<status state=".." reason=".." reason_ttl=".."/>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostStatus {
    pub state: String,
    pub reason: String,
    pub reason_ttl: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    /// `ipv4`, `ipv6` or `mac`.
    pub addrtype: String,
    pub addr: String,
    /// Hardware vendor, only reported for `mac` addresses.
    pub vendor: String,
}

impl Address {
    pub fn is_ipv4(&self) -> bool {
        self.addrtype == IPV4
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hostname {
    pub name: String,
    /// `user` for names given on the command line, `PTR` for reverse lookups.
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Uptime {
    pub lastboot: String,
    pub seconds: u64,
}
