#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Port {
    /// `tcp`, `udp` or `sctp`.
    pub protocol: String,
    pub portid: u16,
    pub state: PortState,
    pub service: Service,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortState {
    /// `open`, `closed`, `filtered`, `open|filtered`, ...
    pub state: String,
    pub reason: String,
    pub reason_ttl: u8,
}

/// Service detection result for a single port.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub product: String,
    pub version: String,
    pub extrainfo: String,
    /// `table` when guessed from the port number, `probed` when fingerprinted.
    pub method: String,
    /// Detection confidence as reported.
    pub conf: u8,
}
