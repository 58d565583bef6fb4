// Copyright (c) 2022 MASSA LABS <info@massa.net>

use displaydoc::Display;
use thiserror::Error;

/// node result
pub type NodeResult<T, E = NodeError> = core::result::Result<T, E>;

/// node error
#[non_exhaustive]
#[derive(Display, Error, Debug)]
pub enum NodeError {
    /// settings error: {0}
    ConfigError(#[from] config::ConfigError),
    /// logging error: {0}
    LoggingError(String),
}
