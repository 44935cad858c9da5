//! Logging setup
//!
//! The `DEBUG` setting is a threshold: a message is shown when its level is
//! at or above it, so lower values show more. `RUST_LOG` overrides it.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Map the `DEBUG` threshold onto a tracing level
pub fn verbosity_filter(debug: i64) -> LevelFilter {
    match debug {
        i64::MIN..=0 => LevelFilter::TRACE,
        1 => LevelFilter::DEBUG,
        2 => LevelFilter::INFO,
        3 => LevelFilter::WARN,
        _ => LevelFilter::ERROR,
    }
}

/// Install the global subscriber
pub fn init(debug: i64, verbose: bool) {
    let mut level = verbosity_filter(debug);
    if verbose && level < LevelFilter::DEBUG {
        level = LevelFilter::DEBUG;
    }

    // Ignore a second init, e.g. from tests sharing a process.
    let _ = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("selclip={}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
