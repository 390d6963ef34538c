pub fn version() {
    println!("nmapcsv version: {}", env!("CARGO_PKG_VERSION"));
}
