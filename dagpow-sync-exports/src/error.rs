// Copyright (c) 2022 MASSA LABS <info@massa.net>

use dagpow_models::{ModelsError, PeerId};
use displaydoc::Display;
use thiserror::Error;

/// sync result
pub type SyncResult<T, E = SyncError> = core::result::Result<T, E>;

/// sync error
#[non_exhaustive]
#[derive(Display, Error, Debug)]
pub enum SyncError {
    /// chain error: {0}
    ChainError(String),
    /// storage error: {0}
    StorageError(String),
    /// could not send to peer {0}: {1}
    PeerSendError(PeerId, String),
    /// peer {0} is not connected
    UnknownPeer(PeerId),
    /// An error occurred during channel communication: {0}
    ChannelError(String),
    /// models error: {0}
    ModelsError(#[from] ModelsError),
    /// Time error {0}
    TimeError(#[from] dagpow_time::TimeError),
}
