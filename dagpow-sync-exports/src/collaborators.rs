// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Interfaces of the subsystems the sync worker relies on. Their
//! implementations live outside of this engine.

use dagpow_models::{Block, BlockHash, Difficulty, ImportOutcome, PeerId, RangeDigest};
use dagpow_time::DagTime;

use crate::{SyncMessage, SyncResult};

/// Block DAG with its validity rules.
#[cfg_attr(any(test, feature = "test-exports"), mockall::automock)]
pub trait Chain: Send + Sync {
    /// Try to connect `block` to the DAG.
    fn try_connect(&self, block: &Block) -> SyncResult<ImportOutcome>;

    /// Cumulative difficulty of the local best chain.
    fn current_max_difficulty(&self) -> Difficulty;

    /// Best cumulative difficulty announced by a peer.
    fn peer_best_known_difficulty(&self) -> Difficulty;

    /// Returns a boxed clone of self.
    fn clone_box(&self) -> Box<dyn Chain>;
}

impl Clone for Box<dyn Chain> {
    fn clone(&self) -> Box<dyn Chain> {
        self.clone_box()
    }
}

/// Persistent block storage.
#[cfg_attr(any(test, feature = "test-exports"), mockall::automock)]
pub trait BlockStore: Send + Sync {
    /// Summary of the blocks of `[start, end)`.
    fn load_digest(&self, start: DagTime, end: DagTime) -> SyncResult<RangeDigest>;

    /// Blocks of `[start, end)`, oldest first.
    fn blocks_in_range(&self, start: DagTime, end: DagTime) -> SyncResult<Vec<Block>>;

    /// Block with identity `hash`, if stored.
    fn get_block(&self, hash: &BlockHash) -> SyncResult<Option<Block>>;

    /// Returns a boxed clone of self.
    fn clone_box(&self) -> Box<dyn BlockStore>;
}

impl Clone for Box<dyn BlockStore> {
    fn clone(&self) -> Box<dyn BlockStore> {
        self.clone_box()
    }
}

/// Connected peers.
#[cfg_attr(any(test, feature = "test-exports"), mockall::automock)]
pub trait ActivePeers: Send + Sync {
    /// Currently connected peers.
    fn active_peers(&self) -> Vec<PeerId>;

    /// Queue `message` for `peer_id`. Never blocks on the network.
    fn send_to_peer(&self, peer_id: &PeerId, message: SyncMessage) -> SyncResult<()>;

    /// Close the connection with `peer_id`.
    fn drop_peer(&self, peer_id: &PeerId);

    /// Returns a boxed clone of self.
    fn clone_box(&self) -> Box<dyn ActivePeers>;
}

impl Clone for Box<dyn ActivePeers> {
    fn clone(&self) -> Box<dyn ActivePeers> {
        self.clone_box()
    }
}
