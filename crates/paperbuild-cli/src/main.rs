mod cli;
mod commands;
mod console;

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = cli.validate() {
        e.exit();
    }
    cli::init_tracing(&cli);

    debug!("Starting paperbuild v{}", env!("CARGO_PKG_VERSION"));

    commands::run(cli)
}
