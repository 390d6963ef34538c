#![cfg(test)]
use nmapcsv_common::config::Config;
use nmapcsv_core::conversion::{ConversionService, ExportSummary};
use nmapcsv_core::inputs::collect_inputs;
use nmapcsv_core::nmap::NmapParser;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

fn reports_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/reports")
}

fn report(name: &str) -> PathBuf {
    reports_dir().join(name)
}

fn run_export(inputs: &[PathBuf], cfg: &Config) -> (String, ExportSummary) {
    let service = ConversionService::new(cfg);
    let mut out = Vec::new();
    let summary = service.export(inputs, &mut out).unwrap();
    (String::from_utf8(out).unwrap(), summary)
}

/// Directory scan picks up `*.xml` in any case and ignores everything else.
#[test]
fn directory_inputs_are_sorted_xml_files() {
    let inputs = collect_inputs(&[], &[reports_dir()]).unwrap();

    let names: Vec<String> = inputs
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.xml", "b.XML", "broken.xml"]);
}

#[test]
fn explicit_files_come_before_directory_files() {
    let inputs = collect_inputs(&[report("b.XML")], &[reports_dir()]).unwrap();

    assert_eq!(inputs.len(), 4);
    assert_eq!(inputs[0], report("b.XML"));
    assert_eq!(inputs[1], report("a.xml"));
}

#[test]
fn export_directory_end_to_end() {
    let inputs = collect_inputs(&[], &[reports_dir()]).unwrap();

    let (table, summary) = run_export(&inputs, &Config::default());

    assert_eq!(
        table,
        "IPv4,hostname,service,port,proto,state,product\n\
         10.0.0.1,beta,https,443,tcp,open,Apache httpd\n\
         10.0.0.20,,domain,53,udp,open,dnsmasq\n\
         192.168.1.10,web01,http,80,tcp,open,nginx\n\
         192.168.1.10,web01,ssh,22,tcp,open,OpenSSH\n"
    );
    assert_eq!(
        summary,
        ExportSummary {
            documents: 2,
            skipped: 1,
            hosts: 3,
            rows: 4,
        }
    );
}

#[test]
fn later_input_wins_for_shared_address() {
    let inputs = vec![report("b.XML"), report("a.xml")];

    let (table, summary) = run_export(
        &inputs,
        &Config {
            verbose: true,
            jobs: 2,
        },
    );

    let rows: Vec<&str> = table.lines().filter(|row| row.starts_with("10.0.0.1,")).collect();
    assert_eq!(rows, vec!["10.0.0.1,alpha,ssh,22,tcp,open,OpenSSH"]);
    assert_eq!(summary.documents, 2);
    assert_eq!(summary.skipped, 0);
}

#[test]
fn result_does_not_depend_on_thread_count() {
    let inputs = collect_inputs(&[report("a.xml")], &[reports_dir()]).unwrap();

    let (single, _) = run_export(
        &inputs,
        &Config {
            verbose: false,
            jobs: 1,
        },
    );
    let (many, _) = run_export(
        &inputs,
        &Config {
            verbose: false,
            jobs: 4,
        },
    );

    assert_eq!(single, many);
}

#[test]
fn no_inputs_yields_header_only() {
    let (table, summary) = run_export(&[], &Config::default());

    assert_eq!(table, "IPv4,hostname,service,port,proto,state,product\n");
    assert_eq!(summary, ExportSummary::default());
}

#[test]
fn report_fields_are_decoded() {
    let result = NmapParser::new()
        .parse_file(&report("a.xml"))
        .unwrap()
        .unwrap();

    assert_eq!(result.scanner, "nmap");
    assert_eq!(result.version, "7.94");
    assert_eq!(result.hosts.len(), 2);

    let web = &result.hosts[1];
    assert_eq!(web.status.as_ref().unwrap().reason, "echo-reply");
    assert_eq!(web.hostnames.len(), 2);
    assert_eq!(web.uptime.as_ref().unwrap().seconds, 86400);

    let os = web.os.as_ref().unwrap();
    let best = os.best_match().unwrap();
    assert_eq!(best.name, "Linux 5.0 - 5.14");
    assert_eq!(best.class.as_ref().unwrap().osgen, "5.X");
    assert_eq!(os.ports_used[0].portid, 22);
}

#[test]
fn unknown_elements_are_reported_and_skipped() {
    let skipped = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&skipped);
    let parser = NmapParser::new()
        .with_missing_element_handler(move |tag| sink.lock().unwrap().push(tag.name().to_string()));

    let result = parser.parse_file(&report("a.xml")).unwrap().unwrap();

    let skipped = skipped.lock().unwrap();
    for name in ["scaninfo", "runstats", "times", "trace", "hop", "extraports"] {
        assert!(skipped.iter().any(|s| s == name), "<{name}> was not reported");
    }
    assert!(!skipped.iter().any(|s| s == "port" || s == "osclass"));
    assert_eq!(result.hosts[1].ports.len(), 2);
}

#[test]
fn malformed_report_is_an_error() {
    assert!(NmapParser::new().parse_file(&report("broken.xml")).is_err());
}

#[test]
fn missing_input_fails_before_decoding() {
    let err = collect_inputs(&[report("absent.xml")], &[]).unwrap_err();

    assert!(err.to_string().contains("absent.xml"));
}
