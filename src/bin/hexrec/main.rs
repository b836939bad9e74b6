//! `hexrec`: convert between Motorola S-record and Intel HEX files.

mod args;

use std::process::ExitCode;

fn main() -> ExitCode {
    args::run()
}
