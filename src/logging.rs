//! Diagnostic logging.
//!
//! Events go to stderr through `tracing`. The filter comes from
//! `DAVIDGNOME_LOG` (same syntax as `RUST_LOG`) and defaults to `warn`, so a
//! normal run prints nothing beyond the assistant's own output.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "DAVIDGNOME_LOG";

pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .try_init();

    if let Err(e) = result {
        eprintln!("davidgnome: logging disabled: {}", e);
    }
}
