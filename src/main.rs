use clap::Parser;
use paw_detector_lib::logging::{init_tracing, init_tracing_with_filter, LOG_ENV};
use paw_detector_lib::Cli;
use std::process::ExitCode;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose && std::env::var_os(LOG_ENV).is_none() {
        init_tracing_with_filter("debug");
    } else {
        init_tracing();
    }

    match paw_detector_lib::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, source = ?std::error::Error::source(&e), "command failed");
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
