//! sqld CLI entry point
//!
//! Parses arguments, serves, prints errors to stderr and exits non-zero
//! on failure. All logic is delegated to the CLI module.

use sqld::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
