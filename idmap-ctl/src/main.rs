//! Id mapping CLI - Show the host id ranges used by nested sandboxes

mod cli;
mod commands;
mod logging;
mod report;

use clap::Parser;
use cli::Cli;
use commands::{show_default_mapping, show_file_mappings};
use console::style;

fn main() {
    let cli = Cli::parse();

    logging::init_logger(cli.verbose);

    let result = match &cli.file {
        Some(path) => show_file_mappings(path, cli.json),
        None => show_default_mapping(&cli.host_config()),
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("error:").red().bold(), e);
        std::process::exit(1);
    }
}
