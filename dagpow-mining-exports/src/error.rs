// Copyright (c) 2022 MASSA LABS <info@massa.net>

use displaydoc::Display;
use thiserror::Error;

use crate::ProducerState;

/// mining result
pub type MiningResult<T, E = MiningError> = core::result::Result<T, E>;

/// mining error
#[non_exhaustive]
#[derive(Display, Error, Debug)]
pub enum MiningError {
    /// block template error: {0}
    TemplateError(String),
    /// producer cannot start from state {0:?}
    InvalidState(ProducerState),
    /// An error occurred during channel communication: {0}
    ChannelError(String),
    /// models error: {0}
    ModelsError(#[from] dagpow_models::ModelsError),
    /// Time error {0}
    TimeError(#[from] dagpow_time::TimeError),
    /// sync error: {0}
    SyncError(#[from] dagpow_sync_exports::SyncError),
}
