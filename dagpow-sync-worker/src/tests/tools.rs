// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crossbeam::channel::Receiver;
use dagpow_channel::receiver::DagReceiver;
use dagpow_models::{Block, SyncStatus};
use dagpow_sync_exports::{
    test_exports::{FakeChain, FakePeers, MemoryBlockStore},
    SyncChannels, SyncConfig, SyncController, SyncEvent, SyncMessage,
};

use crate::start_sync_worker;

/// Configuration whose timer never fires during a test.
pub fn quiet_config() -> SyncConfig {
    SyncConfig {
        sync_start_delay: Duration::from_secs(3600),
        sync_interval: Duration::from_secs(3600),
        stop_timeout: Duration::from_secs(1),
        ..SyncConfig::default()
    }
}

/// Configuration running its first range sync cycle right away.
pub fn eager_config() -> SyncConfig {
    SyncConfig {
        sync_start_delay: Duration::from_millis(10),
        ..quiet_config()
    }
}

/// In-memory chain, storage and peers shared with the worker.
#[derive(Clone, Default)]
pub struct TestNetwork {
    pub chain: FakeChain,
    pub store: MemoryBlockStore,
    pub peers: FakePeers,
    pub status: Arc<SyncStatus>,
}

impl TestNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channels(&self) -> SyncChannels {
        SyncChannels {
            chain: Box::new(self.chain.clone()),
            store: Box::new(self.store.clone()),
            peers: Box::new(self.peers.clone()),
        }
    }
}

/// Start a sync worker, run `test` against it, then stop it.
pub fn sync_test<F>(cfg: SyncConfig, channels: SyncChannels, status: Arc<SyncStatus>, test: F)
where
    F: FnOnce(Box<dyn SyncController>, DagReceiver<SyncEvent>),
{
    let (mut manager, controller, events) = start_sync_worker(cfg, channels, status);
    test(controller, events);
    manager.stop();
}

pub fn new_block_message(block: &Block, ttl: u8) -> SyncMessage {
    SyncMessage::NewBlock {
        raw_block: block.raw().as_bytes().to_vec(),
        ttl,
    }
}

/// Messages already queued for a fake peer.
pub fn drain(receiver: &Receiver<SyncMessage>) -> Vec<SyncMessage> {
    receiver.try_iter().collect()
}

/// Poll `condition` until it holds or `timeout` elapses.
pub fn wait_until<F: Fn() -> bool>(timeout: Duration, condition: F) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
