//! # photo-cleanup CLI
//!
//! ## Usage
//! ```bash
//! photo-cleanup ~/Photos --recursive
//! photo-cleanup ~/Photos -r -d --crc-match
//! ```

mod cli;

use console::style;

fn main() {
    if let Err(error) = cli::run() {
        eprintln!("{} {}", style("error:").red().bold(), error);
        std::process::exit(1);
    }
}
