#![forbid(unsafe_code)]

//! Structured logging setup.
//!
//! Library code only emits `tracing` events; installing a subscriber is
//! the host's choice. With the `logging` feature, [`init`] installs a fmt
//! subscriber filtered by the `WAYMARK_LOG` environment variable
//! (`WAYMARK_LOG=waymark_tour=debug`), falling back to `warn`.

/// Environment variable read by [`init`].
pub const LOG_ENV: &str = "WAYMARK_LOG";

/// Install a global fmt subscriber. Fails if one is already installed.
#[cfg(feature = "logging")]
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_with_default("warn")
}

/// Install a global fmt subscriber with a fallback directive used when
/// `WAYMARK_LOG` is unset or unparsable.
#[cfg(feature = "logging")]
pub fn init_with_default(fallback: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
}
