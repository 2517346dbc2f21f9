//! Diagnostic tracing on stderr.
//!
//! `PJ_LOG` takes an `EnvFilter` directive (`pj=trace`, `debug`, ...). Without
//! it, `--verbose` turns on debug events and everything else stays at warn.

use tracing_subscriber::{prelude::*, EnvFilter};

pub const LOG_ENV: &str = "PJ_LOG";

pub fn init_tracing(verbose: bool) {
    let level = if verbose { "pj=debug" } else { "pj=warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init();
}
