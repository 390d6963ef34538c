pub mod export;
pub mod usage;
pub mod version;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nmapcsv")]
#[command(about = "Turns nmap XML reports into a host/service table.")]
#[command(arg_required_else_help = true)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write one comma-separated row per host and open service
    #[command(name = "exportHosts", aliases = ["export", "e"])]
    ExportHosts {
        /// nmap XML report to read
        #[arg(short = 'i', long = "input", value_name = "FILE")]
        input: Vec<PathBuf>,
        /// Directory whose *.xml reports are read
        #[arg(short = 'D', long = "directory", value_name = "DIR")]
        directory: Vec<PathBuf>,
        /// Verbose logging
        #[arg(short, long)]
        verbose: bool,
        /// Decoder threads, 0 for one per CPU
        #[arg(short, long, default_value_t = 0, value_name = "N")]
        jobs: usize,
    },
    /// Print the version
    Version,
    /// Print the options of every sub-command
    Usage,
    /// Anything else falls back to the usage text
    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
