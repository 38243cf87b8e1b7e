//! kms_epid_gen - KMS host ePID generator
//!
//! Prints Extended Product IDs as a KMS host would report them, decodes
//! existing ones, and lists the host/key reference tables.

mod cli;

#[cfg(feature = "tui")]
mod tui;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries the ePIDs, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    #[cfg(feature = "tui")]
    if cli.tui {
        if let Err(e) = tui::run_tui() {
            eprintln!("TUI Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    #[cfg(not(feature = "tui"))]
    if cli.tui {
        eprintln!("TUI feature not enabled. Rebuild with --features tui");
        std::process::exit(1);
    }

    init_tracing(cli.verbose);

    // Run CLI mode
    if let Err(e) = cli::run_cli(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
