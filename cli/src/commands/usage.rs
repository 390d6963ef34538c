use clap::CommandFactory;

use super::CommandLine;

/// Prints the top-level help followed by the help of every sub-command.
pub fn usage() {
    let mut command = CommandLine::command();
    println!("{}", command.render_help());

    for sub in command.get_subcommands_mut() {
        println!("## {}", sub.get_name());
        println!("{}", sub.render_help());
    }
}
