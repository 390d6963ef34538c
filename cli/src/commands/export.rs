use std::io::{self, BufWriter};
use std::path::PathBuf;

use nmapcsv_common::config::Config;
use nmapcsv_common::{success, warn};
use nmapcsv_core::conversion::ConversionService;
use nmapcsv_core::inputs;

pub fn export_hosts(
    files: &[PathBuf],
    directories: &[PathBuf],
    cfg: &Config,
) -> anyhow::Result<()> {
    let inputs = inputs::collect_inputs(files, directories)?;
    if inputs.is_empty() {
        warn!("No reports to read, specify files with -i or directories with -D");
    }

    let service = ConversionService::new(cfg);
    let summary = service.export(&inputs, BufWriter::new(io::stdout().lock()))?;

    success!(
        "{} report(s) read, {} skipped, {} host(s), {} row(s) written",
        summary.documents,
        summary.skipped,
        summary.hosts,
        summary.rows
    );
    Ok(())
}
