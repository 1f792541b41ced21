//! Logging setup for binaries built on this crate.
//!
//! The library only emits [`tracing`] events. Nothing is printed until a subscriber is installed,
//! which is what [`init_tracing`] does.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs a global subscriber printing events to stderr, with thread names.
///
/// The filter is read from `RUST_LOG` and defaults to `bounded_counter=info`.
/// Does nothing if a global subscriber is already set.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bounded_counter=info"));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_names(true)
                .with_timer(fmt::time::uptime()),
        )
        .with(filter)
        .try_init();
}
