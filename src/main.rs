use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use cloudops_auth::MemorySessionStorage;
use cloudops_portal::{logging, Portal, PortalConfig};
use cloudops_sync::LogNotifier;

/// Loads the configuration, activates the dashboard once and prints the
/// resulting state as JSON.
#[tokio::main]
async fn main() {
    logging::init();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = match PortalConfig::load(path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("{e}");
            process::exit(2);
        }
    };

    let portal = match Portal::from_config(
        &config,
        Arc::new(LogNotifier),
        Arc::new(MemorySessionStorage::new()),
    ) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("{e}");
            process::exit(2);
        }
    };

    portal.store.activate().await;
    let state = portal.store.snapshot().await;

    match serde_json::to_string_pretty(&state) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!("failed to render dashboard state: {e}");
            process::exit(1);
        }
    }
    if let Some(err) = state.error {
        tracing::warn!("dashboard loaded with errors: {err}");
        process::exit(1);
    }
}
