// Copyright (c) 2022 MASSA LABS <info@massa.net>

use displaydoc::Display;
use thiserror::Error;

/// Result alias of this crate
pub type ModelsResult<T, E = ModelsError> = core::result::Result<T, E>;

/// Models error
#[non_exhaustive]
#[derive(Display, Error, Debug)]
pub enum ModelsError {
    /// invalid raw block size: expected {expected} bytes, got {got}
    InvalidBlockSize {
        /// expected size
        expected: usize,
        /// received size
        got: usize,
    },
    /// invalid range digest size: {0}
    InvalidDigestSize(usize),
    /// invalid range: [{0}, {1})
    InvalidRange(u64, u64),
    /// dagpow_hash error: {0}
    HashError(#[from] dagpow_hash::HashError),
    /// Time error {0}
    TimeError(#[from] dagpow_time::TimeError),
}
