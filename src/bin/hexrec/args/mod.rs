//! Command-line parsing and execution.
//!
//! Processing order:
//! 1. Read and detect the input file
//! 2. Relocate (--base)
//! 3. Export (--format, --stype, --record-length, --lowercase)

mod error;
mod execute;
mod io;
mod parse;
mod types;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

pub use types::Args;

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run() -> ExitCode {
    let args = match Args::parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(args.verbose);

    if let Err(e) = args.execute() {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
