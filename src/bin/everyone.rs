//! @everyone interpreter
//!
//! Runs a chat program file. Program output goes to stdout; diagnostics and
//! logs (`RUST_LOG`) go to stderr.

use everyone_core::cli;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let code = match runtime.block_on(cli::run_cli()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    };

    // A cancelled run still blocked on stdin is abandoned here
    runtime.shutdown_timeout(Duration::from_millis(100));
    code
}
