// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Interfaces of the subsystems the producer relies on.

use dagpow_hash::hash::Hash;
use dagpow_models::{config::MINER_ADDRESS_SIZE, RawBlock, Task};
use dagpow_time::DagTime;

use crate::MiningResult;

/// Builds block templates out of the local DAG view and mempool.
#[cfg_attr(any(test, feature = "test-exports"), mockall::automock)]
pub trait BlockTemplateProvider: Send + Sync {
    /// New candidate block to be sent at `send_time`. The nonce field is
    /// overwritten by the producer.
    fn create_block(&self, send_time: DagTime) -> MiningResult<RawBlock>;

    /// Address credited by mined blocks, first bytes of every initial nonce.
    fn miner_address(&self) -> [u8; MINER_ADDRESS_SIZE];

    /// Returns a boxed clone of self.
    fn clone_box(&self) -> Box<dyn BlockTemplateProvider>;
}

impl Clone for Box<dyn BlockTemplateProvider> {
    fn clone(&self) -> Box<dyn BlockTemplateProvider> {
        self.clone_box()
    }
}

/// Pushes tasks to connected miners.
#[cfg_attr(any(test, feature = "test-exports"), mockall::automock)]
pub trait MinerNotifier: Send + Sync {
    /// Dispatch `task` to every miner.
    fn send_task(&self, task: &Task);

    /// Returns a boxed clone of self.
    fn clone_box(&self) -> Box<dyn MinerNotifier>;
}

impl Clone for Box<dyn MinerNotifier> {
    fn clone(&self) -> Box<dyn MinerNotifier> {
        self.clone_box()
    }
}

/// Reward bookkeeping of mined blocks.
#[cfg_attr(any(test, feature = "test-exports"), mockall::automock)]
pub trait AwardManager: Send + Sync {
    /// Record a sealed block so that its reward is paid out to the share owners.
    fn add_award_block(
        &self,
        nonce: [u8; 32],
        midstate: [u8; 32],
        block_hash: Hash,
        timestamp: DagTime,
    );

    /// Returns a boxed clone of self.
    fn clone_box(&self) -> Box<dyn AwardManager>;
}

impl Clone for Box<dyn AwardManager> {
    fn clone(&self) -> Box<dyn AwardManager> {
        self.clone_box()
    }
}
