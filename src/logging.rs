//! Process-wide logging.
//!
//! The library crates log through the `log` facade; the subscriber installed
//! here bridges those records into `tracing` output. `RUST_LOG` selects the
//! filter (default `info`), `CLOUDOPS_LOG_JSON=1` switches to JSON lines.

use tracing_subscriber::EnvFilter;

pub const ENV_LOG_JSON: &str = "CLOUDOPS_LOG_JSON";

/// Install the global subscriber. Calling it again is harmless.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var(ENV_LOG_JSON)
        .map(|v| json_enabled(&v))
        .unwrap_or(false);

    let result = if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    };
    if let Err(e) = result {
        tracing::debug!("logging already initialised: {e}");
    }
}

fn json_enabled(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
