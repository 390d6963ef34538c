//! # Report Conversion Service
//!
//! Implements the "export hosts" use case: decode every input report, merge the hosts,
//! and write the host/service table.
//!
//! Reports are independent, so they are decoded on a thread pool. Results are merged
//! strictly in input order afterwards, which keeps the replace-on-duplicate-address
//! behaviour of [`HostTable::merge`] deterministic.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use nmapcsv_common::config::Config;
use nmapcsv_common::scan::ScanResult;
use nmapcsv_common::{error, info, warn};
use rayon::prelude::*;
use tracing::debug;

use crate::export::HostTable;
use crate::nmap::NmapParser;

/// Counters reported once an export is complete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Reports decoded and merged.
    pub documents: usize,
    /// Reports that could not be read or decoded.
    pub skipped: usize,
    /// Distinct IPv4 addresses in the table.
    pub hosts: usize,
    pub rows: usize,
}

pub struct ConversionService {
    parser: NmapParser,
    verbose: bool,
    jobs: usize,
}

impl ConversionService {
    pub fn new(cfg: &Config) -> Self {
        let parser = if cfg.verbose {
            NmapParser::new()
                .with_missing_element_handler(|tag| debug!("skipping <{}>", tag.name()))
        } else {
            NmapParser::new()
        };

        Self {
            parser,
            verbose: cfg.verbose,
            jobs: cfg.jobs,
        }
    }

    /// Decodes `inputs` and merges them, in the given order, into one table.
    ///
    /// Unreadable or malformed reports are logged and skipped.
    pub fn collect(&self, inputs: &[PathBuf]) -> anyhow::Result<(HostTable, ExportSummary)> {
        let results = self.decode_all(inputs)?;

        let mut table = HostTable::new();
        let mut summary = ExportSummary::default();
        for result in results {
            match result {
                Some(result) => {
                    table.merge(result);
                    summary.documents += 1;
                }
                None => summary.skipped += 1,
            }
        }
        summary.hosts = table.len();

        Ok((table, summary))
    }

    /// Runs the whole conversion and writes the table to `out`.
    pub fn export<W: Write>(&self, inputs: &[PathBuf], out: W) -> anyhow::Result<ExportSummary> {
        let (table, mut summary) = self.collect(inputs)?;
        summary.rows = table
            .write_csv(out)
            .context("Failed to write the host table")?;
        Ok(summary)
    }

    fn decode_all(&self, inputs: &[PathBuf]) -> anyhow::Result<Vec<Option<ScanResult>>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .context("Failed to start the decoder threads")?;

        Ok(pool.install(|| {
            inputs
                .par_iter()
                .map(|path| self.decode_one(path))
                .collect()
        }))
    }

    fn decode_one(&self, path: &Path) -> Option<ScanResult> {
        if self.verbose {
            info!("processing file: {}", path.display());
        }

        match self.parser.parse_file(path) {
            Ok(Some(result)) => Some(result),
            Ok(None) => {
                warn!("No scan report found in {}", path.display());
                None
            }
            Err(e) => {
                error!("Error parsing XML document {}: {e}", path.display());
                None
            }
        }
    }
}
