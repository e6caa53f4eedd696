use std::process;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use seabook::cli::{self, Cli};
use seabook::config::Config;
use seabook::lifecycle::SeaService;
use seabook::storage::Storage;

fn main() {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });

    init_logging(cli.verbose, config.log_filter.as_deref());

    let path = config.database_path(cli.db.as_deref()).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });

    let storage = match Storage::open(&path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to open {}: {e}", path.display());
            process::exit(1);
        }
    };

    let mut service = match SeaService::load(storage) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to load records: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = cli::run(cli.command, &mut service) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Logs go to stderr so command output on stdout stays clean.
fn init_logging(verbose: bool, configured: Option<&str>) {
    let filter = match (verbose, configured) {
        (true, _) => EnvFilter::new("seabook=debug"),
        (false, Some(directive)) => EnvFilter::new(directive),
        (false, None) => EnvFilter::new("seabook=warn"),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
