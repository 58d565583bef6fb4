// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Recording collaborators for producer tests.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use crossbeam::channel::{unbounded, Receiver, Sender};
use dagpow_hash::hash::Hash;
use dagpow_models::{config::MINER_ADDRESS_SIZE, test_exports::make_block, RawBlock, Task};
use dagpow_time::DagTime;
use parking_lot::Mutex;

use crate::{AwardManager, BlockTemplateProvider, MinerNotifier, MiningResult};

/// Address returned by [`TestTemplateProvider`].
pub const TEST_MINER_ADDRESS: [u8; MINER_ADDRESS_SIZE] = [0xab; MINER_ADDRESS_SIZE];

/// Template provider returning a distinct root block per call.
#[derive(Clone, Default)]
pub struct TestTemplateProvider {
    created: Arc<AtomicU64>,
    templates: Arc<Mutex<Vec<RawBlock>>>,
}

impl TestTemplateProvider {
    /// fresh provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of templates built so far.
    pub fn created(&self) -> u64 {
        self.created.load(Ordering::SeqCst)
    }

    /// Last template handed out.
    pub fn last_template(&self) -> Option<RawBlock> {
        self.templates.lock().last().cloned()
    }
}

impl BlockTemplateProvider for TestTemplateProvider {
    fn create_block(&self, send_time: DagTime) -> MiningResult<RawBlock> {
        let salt = self.created.fetch_add(1, Ordering::SeqCst);
        let raw = make_block(send_time, None, salt).into_raw();
        self.templates.lock().push(raw.clone());
        Ok(raw)
    }

    fn miner_address(&self) -> [u8; MINER_ADDRESS_SIZE] {
        TEST_MINER_ADDRESS
    }

    fn clone_box(&self) -> Box<dyn BlockTemplateProvider> {
        Box::new(self.clone())
    }
}

/// Notifier forwarding every task to a channel.
#[derive(Clone)]
pub struct RecordingNotifier {
    tasks: Sender<Task>,
}

impl RecordingNotifier {
    /// notifier and the receiving end of its tasks
    pub fn new() -> (Self, Receiver<Task>) {
        let (tasks, receiver) = unbounded();
        (RecordingNotifier { tasks }, receiver)
    }
}

impl MinerNotifier for RecordingNotifier {
    fn send_task(&self, task: &Task) {
        let _ = self.tasks.send(task.clone());
    }

    fn clone_box(&self) -> Box<dyn MinerNotifier> {
        Box::new(self.clone())
    }
}

/// One recorded award.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardRecord {
    /// sealed nonce, miner byte order
    pub nonce: [u8; 32],
    /// midstate of the task
    pub midstate: [u8; 32],
    /// sealed block hash
    pub block_hash: Hash,
    /// block timestamp
    pub timestamp: DagTime,
}

/// Award manager keeping every call.
#[derive(Clone, Default)]
pub struct RecordingAwards(Arc<Mutex<Vec<AwardRecord>>>);

impl RecordingAwards {
    /// nothing recorded
    pub fn new() -> Self {
        Self::default()
    }

    /// recorded awards, oldest first
    pub fn records(&self) -> Vec<AwardRecord> {
        self.0.lock().clone()
    }
}

impl AwardManager for RecordingAwards {
    fn add_award_block(
        &self,
        nonce: [u8; 32],
        midstate: [u8; 32],
        block_hash: Hash,
        timestamp: DagTime,
    ) {
        self.0.lock().push(AwardRecord {
            nonce,
            midstate,
            block_hash,
            timestamp,
        });
    }

    fn clone_box(&self) -> Box<dyn AwardManager> {
        Box::new(self.clone())
    }
}
