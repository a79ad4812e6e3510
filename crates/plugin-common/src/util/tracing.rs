use log::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{CommonError, CommonResult};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when it is set; otherwise `level` (or `info`) is used for
/// every target.
pub fn setup_tracing(level: Option<LevelFilter>) -> CommonResult {
    let level = level.unwrap_or(LevelFilter::Info);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive_for(level)));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| CommonError::Tracing(e.to_string()))
}

fn directive_for(level: LevelFilter) -> &'static str {
    match level {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
