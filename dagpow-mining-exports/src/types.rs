// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::collections::BTreeMap;

use dagpow_hash::hash::Hash;
use dagpow_models::{config::BEST_SHARE_WINDOW_SLOTS, ChannelId, Difficulty};
use dagpow_sync_exports::{ActivePeers, SyncController};
use dagpow_time::DagTime;
use serde::Serialize;

use crate::{AwardManager, BlockTemplateProvider, MinerNotifier};

/// Lifecycle of the block producer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProducerState {
    /// no thread running
    Stopped,
    /// sealing blocks
    Running,
    /// threads running but the node is still catching up: cycles roll over
    /// without sealing
    Syncing,
}

/// Share statistics of one miner connection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChannelStats {
    /// shares for the current task
    pub accepted: u64,
    /// shares for another task
    pub stale: u64,
    /// best finalization hash found by this channel
    pub best_hash: Option<Hash>,
    /// time of the last share
    pub last_share_time: Option<DagTime>,
}

/// Production statistics snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProducerStats {
    /// lifecycle state
    pub state: ProducerState,
    /// index of the current task, if any
    pub task_index: Option<u64>,
    /// best hash of the current candidate
    pub best_hash: Option<Hash>,
    /// highest network difficulty reported
    pub network_difficulty: Difficulty,
    /// blocks sealed since start
    pub blocks_produced: u64,
    /// best share hash of each of the last 16 main periods
    pub best_share_window: Vec<Option<Hash>>,
    /// per connection share statistics
    pub channels: BTreeMap<ChannelId, ChannelStats>,
}

impl ProducerStats {
    /// stats of a producer that never ran
    pub fn new(state: ProducerState) -> Self {
        ProducerStats {
            state,
            task_index: None,
            best_hash: None,
            network_difficulty: Difficulty::default(),
            blocks_produced: 0,
            best_share_window: vec![None; BEST_SHARE_WINDOW_SLOTS],
            channels: BTreeMap::new(),
        }
    }
}

/// List of channels the producer will send commands to
#[derive(Clone)]
pub struct MiningChannels {
    /// builds candidate blocks
    pub template: Box<dyn BlockTemplateProvider>,
    /// dispatches tasks to miners
    pub notifier: Box<dyn MinerNotifier>,
    /// reward bookkeeping
    pub award: Box<dyn AwardManager>,
    /// admission path shared with peer blocks
    pub sync: Box<dyn SyncController>,
    /// broadcast targets
    pub peers: Box<dyn ActivePeers>,
}
