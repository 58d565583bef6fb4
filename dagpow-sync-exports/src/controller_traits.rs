// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! This module exports generic traits representing interfaces for interacting
//! with the sync worker.

use dagpow_models::{BlockWrapper, ImportOutcome, PeerId, SyncState};

use crate::{SyncMessage, SyncResult};

/// interface that communicates with the sync worker
#[cfg_attr(any(test, feature = "test-exports"), mockall::automock)]
pub trait SyncController: Send + Sync {
    /// Admit a block into the chain, buffering it when its parent is unknown
    /// and replaying the orphans it unlocks.
    fn validate_and_add(&self, wrapper: BlockWrapper) -> SyncResult<ImportOutcome>;

    /// Handle a sync message received from `peer`.
    fn on_message(&self, peer: PeerId, message: SyncMessage);

    /// Current sync state.
    fn sync_state(&self) -> SyncState;

    /// Number of blocks waiting for a parent.
    fn pending_count(&self) -> usize;

    /// Returns a boxed clone of self.
    /// Useful to allow cloning `Box<dyn SyncController>`.
    fn clone_box(&self) -> Box<dyn SyncController>;
}

/// Allow cloning `Box<dyn SyncController>`
/// Uses `SyncController::clone_box` internally
impl Clone for Box<dyn SyncController> {
    fn clone(&self) -> Box<dyn SyncController> {
        self.clone_box()
    }
}

/// Sync manager used to stop the sync thread
pub trait SyncManager {
    /// Stop the sync thread
    /// Note that we do not take self by value to consume it
    /// because it is not allowed to move out of Box<dyn SyncManager>
    fn stop(&mut self);
}
