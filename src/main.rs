//! Verity CLI binary.

use std::io::Write;
use std::process;

use clap::Parser;
use env_logger::Builder;
use log::{Level, LevelFilter};

use verity::cli::args::*;
use verity::cli::commands::*;

/// Environment variable holding `env_logger` directives, e.g. `verity::model=debug`.
const LOG_ENV: &str = "VERITY_LOG";

fn main() {
    let args = VerityArgs::parse();

    // Flags override the global level from VERITY_LOG; per-module directives survive
    let mut builder = Builder::new();
    builder.filter_level(LevelFilter::Warn).parse_env(LOG_ENV);
    if let Some(level) = args.log_filter() {
        builder.filter_level(level);
    }

    builder
        .format(|buf, record| match record.level() {
            Level::Debug | Level::Trace => writeln!(
                buf,
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            ),
            _ => writeln!(buf, "[{}] {}", record.level(), record.args()),
        })
        .init();

    if let Err(e) = execute_command(args) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
