//! Grantflow CLI entry point.

use clap::Parser;

use grantflow::cli::{handle_error, run, Cli};

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli) {
        handle_error(err, json);
    }
}
