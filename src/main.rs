//! Main entry point for the tabsync CLI

use clap::Parser;
use tabsync::cli::Cli;
use tabsync::commands::execute_command;

fn main() {
    // Parse command line arguments; logging is configured by the command
    // layer once the configuration file has been read
    let cli = Cli::parse();

    if let Err(e) = execute_command(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
