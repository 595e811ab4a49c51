#![recursion_limit = "256"]

mod cli;
mod application;
mod domain;
mod data;
mod ml;
mod infra;

use anyhow::Result;
use cli::Cli;
use clap::Parser;

fn main() -> Result<()> {
    // Logging is installed per subcommand: `test` also writes a log file.
    let cli = Cli::parse();
    cli.run()
}
