//! # Nmap Report Decoding
//!
//! Wires [`ElementDecoder`]s together for the subset of the nmap XML format that the
//! exporter understands. Everything else in a report (scan info, timing, traceroute,
//! script output, ...) is skipped.

use std::path::Path;

use nmapcsv_common::scan::{
    Address, Host, HostStatus, Hostname, Os, OsClass, OsMatch, Port, PortState, PortUsed,
    ScanResult, Service, Uptime,
};

use crate::builder::event::{EventSource, StartTag, XmlEventReader};
use crate::builder::{DecodeError, DocumentDecoder, ElementDecoder, parse_or};

/// Decodes nmap XML reports into [`ScanResult`]s.
///
/// One parser can be shared by any number of threads; each call decodes one document.
pub struct NmapParser {
    document: DocumentDecoder<ScanResult>,
}

impl Default for NmapParser {
    fn default() -> Self {
        Self::new()
    }
}

impl NmapParser {
    pub fn new() -> Self {
        Self {
            document: DocumentDecoder::first_element(scan_result_decoder()),
        }
    }

    /// Reports every element the parser does not decode.
    pub fn with_missing_element_handler(
        self,
        handler: impl Fn(&StartTag) + Send + Sync + 'static,
    ) -> Self {
        Self {
            document: self.document.on_missing_element(handler),
        }
    }

    /// Decodes one report. `Ok(None)` means the input held no element at all.
    pub fn parse(&self, events: &mut dyn EventSource) -> Result<Option<ScanResult>, DecodeError> {
        self.document.decode_document(events)
    }

    pub fn parse_str(&self, xml: &str) -> Result<Option<ScanResult>, DecodeError> {
        self.parse(&mut XmlEventReader::from_xml(xml))
    }

    pub fn parse_file(&self, path: &Path) -> Result<Option<ScanResult>, DecodeError> {
        self.parse(&mut XmlEventReader::open(path)?)
    }
}

fn scan_result_decoder() -> ElementDecoder<ScanResult> {
    ElementDecoder::new("nmaprun", ScanResult::default)
        .attribute("scanner", |r, v| r.scanner = v.to_owned())
        .attribute("args", |r, v| r.args = v.to_owned())
        .attribute("version", |r, v| r.version = v.to_owned())
        .child(host_decoder(), |r, host| r.hosts.push(host))
}

fn host_decoder() -> ElementDecoder<Host> {
    ElementDecoder::new("host", Host::default)
        .attribute("comment", |h, v| h.comment = v.to_owned())
        .child(status_decoder(), |h, status| h.status = Some(status))
        .child(address_decoder(), |h, addr| h.addresses.push(addr))
        .child(hostnames_decoder(), |h, names| h.hostnames.extend(names))
        .child(ports_decoder(), |h, ports| h.ports.extend(ports))
        .child(os_decoder(), |h, os| h.os = Some(os))
        .child(uptime_decoder(), |h, uptime| h.uptime = Some(uptime))
}

fn status_decoder() -> ElementDecoder<HostStatus> {
    ElementDecoder::new("status", HostStatus::default)
        .attribute("state", |s, v| s.state = v.to_owned())
        .attribute("reason", |s, v| s.reason = v.to_owned())
        .attribute("reason_ttl", |s, v| s.reason_ttl = parse_or(v, 0))
}

fn address_decoder() -> ElementDecoder<Address> {
    ElementDecoder::new("address", Address::default)
        .attribute("addrtype", |a, v| a.addrtype = v.to_owned())
        .attribute("addr", |a, v| a.addr = v.to_owned())
        .attribute("vendor", |a, v| a.vendor = v.to_owned())
}

fn hostnames_decoder() -> ElementDecoder<Vec<Hostname>> {
    let hostname = ElementDecoder::new("hostname", Hostname::default)
        .attribute("name", |h, v| h.name = v.to_owned())
        .attribute("type", |h, v| h.kind = v.to_owned());

    ElementDecoder::new("hostnames", Vec::new).child(hostname, Vec::push)
}

fn ports_decoder() -> ElementDecoder<Vec<Port>> {
    ElementDecoder::new("ports", Vec::new).child(port_decoder(), Vec::push)
}

fn port_decoder() -> ElementDecoder<Port> {
    let state = ElementDecoder::new("state", PortState::default)
        .attribute("state", |s, v| s.state = v.to_owned())
        .attribute("reason", |s, v| s.reason = v.to_owned())
        .attribute("reason_ttl", |s, v| s.reason_ttl = parse_or(v, 0));

    let service = ElementDecoder::new("service", Service::default)
        .attribute("name", |s, v| s.name = v.to_owned())
        .attribute("product", |s, v| s.product = v.to_owned())
        .attribute("version", |s, v| s.version = v.to_owned())
        .attribute("extrainfo", |s, v| s.extrainfo = v.to_owned())
        .attribute("method", |s, v| s.method = v.to_owned())
        .attribute("conf", |s, v| s.conf = parse_or(v, 0));

    ElementDecoder::new("port", Port::default)
        .attribute("protocol", |p, v| p.protocol = v.to_owned())
        .attribute("portid", |p, v| p.portid = parse_or(v, 0))
        .child(state, |p, state| p.state = state)
        .child(service, |p, service| p.service = service)
}

fn os_decoder() -> ElementDecoder<Os> {
    let class = ElementDecoder::new("osclass", OsClass::default)
        .attribute("type", |c, v| c.kind = v.to_owned())
        .attribute("osfamily", |c, v| c.osfamily = v.to_owned())
        .attribute("vendor", |c, v| c.vendor = v.to_owned())
        .attribute("osgen", |c, v| c.osgen = v.to_owned())
        .attribute("accuracy", |c, v| c.accuracy = parse_or(v, 0));

    let os_match = ElementDecoder::new("osmatch", OsMatch::default)
        .attribute("name", |m, v| m.name = v.to_owned())
        .attribute("accuracy", |m, v| m.accuracy = parse_or(v, 0))
        .attribute("line", |m, v| m.line = parse_or(v, 0))
        .child(class, |m, class| m.class = Some(class));

    let port_used = ElementDecoder::new("portused", PortUsed::default)
        .attribute("state", |p, v| p.state = v.to_owned())
        .attribute("proto", |p, v| p.proto = v.to_owned())
        .attribute("portid", |p, v| p.portid = parse_or(v, 0));

    ElementDecoder::new("os", Os::default)
        .child(os_match, |os, m| os.matches.push(m))
        .child(port_used, |os, p| os.ports_used.push(p))
}

fn uptime_decoder() -> ElementDecoder<Uptime> {
    ElementDecoder::new("uptime", Uptime::default)
        .attribute("lastboot", |u, v| u.lastboot = v.to_owned())
        .attribute("seconds", |u, v| u.seconds = parse_or(v, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE nmaprun>
<nmaprun scanner="nmap" args="nmap -A -oX - 192.168.1.10" start="1700000000" version="7.94">
  <scaninfo type="syn" protocol="tcp" numservices="1000" services="1-1000"/>
  <verbose level="0"/>
  <host starttime="1700000001" endtime="1700000042" comment="dmz">
    <status state="up" reason="arp-response" reason_ttl="0"/>
    <address addr="192.168.1.10" addrtype="ipv4"/>
    <address addr="00:0C:29:AA:BB:CC" addrtype="mac" vendor="VMware"/>
    <hostnames>
      <hostname name="web01" type="user"/>
      <hostname name="web01.lan" type="PTR"/>
    </hostnames>
    <ports>
      <extraports state="closed" count="998">
        <extrareasons reason="resets" count="998"/>
      </extraports>
      <port protocol="tcp" portid="80">
        <state state="open" reason="syn-ack" reason_ttl="64"/>
        <service name="http" product="nginx" version="1.18.0" extrainfo="Ubuntu" method="probed" conf="10"/>
        <script id="http-title" output="Welcome"><elem key="title">Welcome</elem></script>
      </port>
      <port protocol="tcp" portid="22">
        <state state="open" reason="syn-ack" reason_ttl="64"/>
        <service name="ssh" product="openssh" method="probed" conf="10"><cpe>cpe:/a:openbsd:openssh</cpe></service>
      </port>
    </ports>
    <os>
      <portused state="open" proto="tcp" portid="22"/>
      <osmatch name="Linux 5.0 - 5.4" accuracy="98" line="67130">
        <osclass type="general purpose" vendor="Linux" osfamily="Linux" osgen="5.X" accuracy="98"><cpe>cpe:/o:linux:linux_kernel:5</cpe></osclass>
      </osmatch>
    </os>
    <uptime seconds="86400" lastboot="Tue Nov 14 12:00:00 2023"/>
    <trace port="80" proto="tcp"><hop ttl="1" ipaddr="192.168.1.10" rtt="0.30"/></trace>
  </host>
  <runstats><finished time="1700000042" exit="success"/></runstats>
</nmaprun>
"#;

    #[test]
    fn test_full_report() {
        let result = NmapParser::new().parse_str(REPORT).unwrap().unwrap();

        assert_eq!(result.scanner, "nmap");
        assert_eq!(result.version, "7.94");
        assert_eq!(result.args, "nmap -A -oX - 192.168.1.10");
        assert_eq!(result.hosts.len(), 1);

        let host = &result.hosts[0];
        assert_eq!(host.comment, "dmz");
        assert_eq!(
            host.status,
            Some(HostStatus {
                state: "up".to_string(),
                reason: "arp-response".to_string(),
                reason_ttl: 0,
            })
        );
        assert_eq!(host.addresses.len(), 2);
        assert_eq!(host.addresses[1].vendor, "VMware");
        assert_eq!(host.primary_hostname(), "web01");
        assert_eq!(host.hostnames[1].kind, "PTR");

        let ports: Vec<(u16, &str, &str)> = host
            .ports
            .iter()
            .map(|p| (p.portid, p.service.name.as_str(), p.service.product.as_str()))
            .collect();
        assert_eq!(ports, vec![(80, "http", "nginx"), (22, "ssh", "openssh")]);

        let http = &host.ports[0];
        assert_eq!(http.protocol, "tcp");
        assert_eq!(http.state.state, "open");
        assert_eq!(http.state.reason, "syn-ack");
        assert_eq!(http.state.reason_ttl, 64);
        assert_eq!(http.service.version, "1.18.0");
        assert_eq!(http.service.extrainfo, "Ubuntu");
        assert_eq!(http.service.method, "probed");
        assert_eq!(http.service.conf, 10);

        let os = host.os.as_ref().unwrap();
        assert_eq!(os.ports_used.len(), 1);
        assert_eq!(os.ports_used[0].portid, 22);
        assert_eq!(os.matches[0].name, "Linux 5.0 - 5.4");
        assert_eq!(os.matches[0].line, 67130);
        let class = os.matches[0].class.as_ref().unwrap();
        assert_eq!(class.kind, "general purpose");
        assert_eq!(class.osgen, "5.X");
        assert_eq!(class.accuracy, 98);

        assert_eq!(
            host.uptime,
            Some(Uptime {
                lastboot: "Tue Nov 14 12:00:00 2023".to_string(),
                seconds: 86400,
            })
        );
    }

    #[test]
    fn test_sparse_host_uses_defaults() {
        let xml = r#"<nmaprun><host><address addr="10.0.0.1" addrtype="ipv4"/><ports><port/></ports></host></nmaprun>"#;

        let result = NmapParser::new().parse_str(xml).unwrap().unwrap();

        let host = &result.hosts[0];
        assert_eq!(host.comment, "");
        assert!(host.status.is_none());
        assert!(host.hostnames.is_empty());
        assert!(host.os.is_none());
        assert!(host.uptime.is_none());
        assert_eq!(host.ports, vec![Port::default()]);
        assert_eq!(host.ports[0].service, Service::default());
    }

    #[test]
    fn test_invalid_numbers_become_zero() {
        let xml = r#"<nmaprun><host><ports>
            <port protocol="udp" portid="99999"><service name="x" conf="high"/></port>
            <port protocol="udp" portid="-1"/>
        </ports></host></nmaprun>"#;

        let result = NmapParser::new().parse_str(xml).unwrap().unwrap();

        let ports = &result.hosts[0].ports;
        assert_eq!(ports[0].portid, 0);
        assert_eq!(ports[0].service.conf, 0);
        assert_eq!(ports[0].service.name, "x");
        assert_eq!(ports[1].portid, 0);
    }

    #[test]
    fn test_hosts_keep_document_order() {
        let xml = r#"<nmaprun>
            <host><address addr="10.0.0.5" addrtype="ipv4"/></host>
            <host><address addr="10.0.0.1" addrtype="ipv4"/></host>
            <host><address addr="10.0.0.20" addrtype="ipv4"/></host>
        </nmaprun>"#;

        let result = NmapParser::new().parse_str(xml).unwrap().unwrap();

        let addrs: Vec<&str> = result
            .hosts
            .iter()
            .map(|h| h.addresses[0].addr.as_str())
            .collect();
        assert_eq!(addrs, vec!["10.0.0.5", "10.0.0.1", "10.0.0.20"]);
    }

    #[test]
    fn test_skipped_elements_are_reported() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let parser = NmapParser::new().with_missing_element_handler(move |tag| {
            sink.lock().unwrap().push(tag.name().to_string());
        });
        let xml = r#"<nmaprun><host><trace><hop ttl="1"/></trace><times srtt="1"/></host></nmaprun>"#;

        let result = parser.parse_str(xml).unwrap().unwrap();

        assert_eq!(result.hosts.len(), 1);
        assert_eq!(*seen.lock().unwrap(), vec!["trace", "hop", "times"]);
    }

    #[test]
    fn test_empty_input_is_absent() {
        assert!(NmapParser::new().parse_str("").unwrap().is_none());
    }

    #[test]
    fn test_missing_file_is_an_open_error() {
        let result = NmapParser::new().parse_file(Path::new("/nonexistent/scan.xml"));

        assert!(matches!(result, Err(DecodeError::Open { .. })));
    }
}
