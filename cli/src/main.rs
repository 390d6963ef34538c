mod commands;
mod terminal;

use commands::{CommandLine, Commands, export, usage, version};
use nmapcsv_common::config::Config;

fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    let verbose = matches!(commands.command, Commands::ExportHosts { verbose: true, .. });
    terminal::logging::init_logging(verbose);

    match commands.command {
        Commands::ExportHosts {
            input,
            directory,
            verbose,
            jobs,
        } => {
            let cfg = Config { verbose, jobs };
            export::export_hosts(&input, &directory, &cfg)
        }
        Commands::Version => {
            version::version();
            Ok(())
        }
        Commands::Usage => {
            usage::usage();
            Ok(())
        }
        Commands::Unknown(_) => {
            usage::usage();
            std::process::exit(2);
        }
    }
}
