// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! This module exports generic traits representing interfaces for interacting
//! with the block producer.

use dagpow_hash::hash::Hash;
use dagpow_models::{ChannelId, Difficulty, Share};

use crate::{MiningResult, ProducerState, ProducerStats};

/// interface that communicates with the block producer threads
#[cfg_attr(any(test, feature = "test-exports"), mockall::automock)]
pub trait MiningController: Send + Sync {
    /// Leave `Stopped`: build the first candidate, dispatch its task and
    /// spawn the event loop, timer and broadcaster threads.
    fn start(&self) -> MiningResult<()>;

    /// Queue a share submitted on `channel`. Dropped unless running.
    fn receive_share(&self, channel: ChannelId, share: Share);

    /// Queue the notice of a better competing tip. Dropped unless running.
    fn receive_new_pretop(&self, tip: Hash);

    /// Queue the network difficulty reported by the pool.
    fn receive_new_diff(&self, difficulty: Difficulty);

    /// Current state.
    fn state(&self) -> ProducerState;

    /// Snapshot of the production statistics.
    fn get_stats(&self) -> ProducerStats;

    /// Returns a boxed clone of self.
    /// Useful to allow cloning `Box<dyn MiningController>`.
    fn clone_box(&self) -> Box<dyn MiningController>;
}

/// Allow cloning `Box<dyn MiningController>`
/// Uses `MiningController::clone_box` internally
impl Clone for Box<dyn MiningController> {
    fn clone(&self) -> Box<dyn MiningController> {
        self.clone_box()
    }
}

/// Mining manager used to stop the producer threads
pub trait MiningManager {
    /// Stop the producer threads
    /// Note that we do not take self by value to consume it
    /// because it is not allowed to move out of Box<dyn MiningManager>
    fn stop(&mut self);
}
