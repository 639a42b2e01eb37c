//! Process-wide `tracing` setup.

use std::sync::OnceLock;

use tracing_subscriber::{fmt as tracing_fmt, EnvFilter};

static INIT: OnceLock<()> = OnceLock::new();

/// Environment variable that overrides the configured filter.
pub const LOG_ENV: &str = "STRATA_LOG";

/// Install a stderr subscriber using `filter` unless `STRATA_LOG` is set.
///
/// Only the first call has an effect. A subscriber installed by the host
/// process wins over this one.
pub fn init_with_level(filter: &str) {
    INIT.get_or_init(|| {
        let env_filter = match std::env::var(LOG_ENV) {
            Ok(directive) if !directive.trim().is_empty() => EnvFilter::new(directive.trim()),
            _ => EnvFilter::new(filter),
        };

        let _ = tracing_fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .try_init();
    });
}

pub fn init() {
    init_with_level("info");
}

pub use tracing::{debug, error, info, trace, warn};
