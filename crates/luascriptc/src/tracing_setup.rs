//! Tracing initialization for the CLI.
//!
//! Controlled by environment variables:
//! - `LUASCRIPTC_LOG`: filter string (`RUST_LOG` syntax). Falls back to `RUST_LOG`.
//!
//! When neither is set, defaults to `warn` level. Library crates only emit
//! through the `tracing` facade; installing a subscriber is this binary's
//! job alone.

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

/// Installs the global tracing subscriber. Safe to call multiple times —
/// only the first call takes effect.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_env("LUASCRIPTC_LOG")
            .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    });
}
