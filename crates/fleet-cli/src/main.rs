//! Fleet Manager - trucks, vans and the packages they carry
//!
//! A CLI over the local fleet store: vehicle and package edits,
//! capacity-guarded loading and dashboard statistics.

mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = commands::execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
