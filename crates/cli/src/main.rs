//! Storefront cart command line

use std::{io, process::ExitCode};

use clap::Parser;

mod cli;
mod config;
mod observability;
mod table;

use cli::Cli;

fn main() -> ExitCode {
    // Load .env file if present (ignore if missing)
    _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = observability::init_subscriber(&cli.config.logging) {
        report(&error);
        return ExitCode::FAILURE;
    }

    match cli.run(&mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report(&error);
            ExitCode::FAILURE
        }
    }
}

#[expect(clippy::print_stderr, reason = "top-level error reporting")]
fn report(error: &dyn std::error::Error) {
    eprintln!("error: {error}");
}
