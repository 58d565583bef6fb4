// Copyright (c) 2022 MASSA LABS <info@massa.net>

use displaydoc::Display;
use thiserror::Error;

/// hash error
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone)]
pub enum HashError {
    /// parsing error: {0}
    ParsingError(String),
    /// wrong prefix length: {0} bytes is not a multiple of the SHA-256 block size
    UnalignedPrefix(usize),
}
