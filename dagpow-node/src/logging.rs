// Copyright (c) 2022 MASSA LABS <info@massa.net>

use tracing_subscriber::EnvFilter;

use crate::{NodeError, NodeResult};

/// Filter directive of a configured verbosity, 0 being errors only.
pub fn level_directive(level: usize) -> &'static str {
    match level {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    }
}

/// Install the global fmt subscriber. `RUST_LOG`, when set, wins over `level`.
pub fn init_logging(level: usize) -> NodeResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init()
        .map_err(|err| NodeError::LoggingError(err.to_string()))
}
