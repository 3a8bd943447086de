//! Tracing subscriber setup
//!
//! Library code only emits `tracing` events; binaries and tests decide where
//! they go. The filter is read from `HSDP_LOG` (falling back to `RUST_LOG`,
//! then `info`).

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive
pub const LOG_ENV: &str = "HSDP_LOG";

/// Output format for [`init_tracing`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Build the filter from `HSDP_LOG`, `RUST_LOG`, or the default level
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a global subscriber.
///
/// Returns `false` if a subscriber was already installed (e.g. by another
/// test in the same binary); that case is not an error.
pub fn init_tracing(format: LogFormat) -> bool {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter()).with_target(true);
    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.is_ok()
}
