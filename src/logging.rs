//! Diagnostic logging setup for the binary.
//!
//! Library code only emits `tracing` events; this installs the
//! subscriber. Output goes to stderr so it never mixes with command
//! output on stdout.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `debug`,
/// `securepass=info`).
pub const LOG_ENV: &str = "SECUREPASS_LOG";

/// Install the global subscriber. Defaults to `warn` when `SECUREPASS_LOG`
/// is unset or invalid. Calling it twice is harmless.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
