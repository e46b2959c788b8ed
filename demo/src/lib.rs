//! Shared setup for the example programs.

use std::process::ExitCode;

/// Send `tracing` output to stderr, filtered by `RUST_LOG` (default: warn).
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// Exit status for a finished parse: 0 on success, 1 on any failure
/// including `--help`.
pub fn exit_code(result: &argtree::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if !err.is_help() {
                tracing::debug!(error = %err, "parse failed");
            }
            ExitCode::FAILURE
        }
    }
}
