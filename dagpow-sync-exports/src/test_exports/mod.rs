// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! In-memory collaborators whose behaviour evolves across a test.

use std::{
    collections::{HashMap, HashSet},
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
};

use crossbeam::channel::{unbounded, Receiver, Sender};
use dagpow_models::{
    config::RAW_BLOCK_SIZE, test_exports::parent_of, Block, BlockHash, Difficulty, ImportOutcome,
    PeerId, RangeDigest,
};
use dagpow_time::DagTime;
use parking_lot::{Mutex, RwLock};

use crate::{ActivePeers, BlockStore, Chain, SyncError, SyncMessage, SyncResult};

/// Peer listening on `127.0.0.1:<port>`.
pub fn test_peer(port: u16) -> PeerId {
    PeerId(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port))
}

#[derive(Default)]
struct FakeChainState {
    known: HashSet<BlockHash>,
    invalid: HashSet<BlockHash>,
    imported: Vec<BlockHash>,
    difficulty: Difficulty,
    peer_best: Difficulty,
}

/// Chain accepting any block whose parent (see `parent_of`) is known.
/// Every import adds 1 to the local difficulty.
#[derive(Clone, Default)]
pub struct FakeChain(Arc<Mutex<FakeChainState>>);

impl FakeChain {
    /// empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `hash` as already connected.
    pub fn add_known(&self, hash: BlockHash) {
        self.0.lock().known.insert(hash);
    }

    /// Make every later connection of `hash` fail validation.
    pub fn mark_invalid(&self, hash: BlockHash) {
        self.0.lock().invalid.insert(hash);
    }

    /// Best difficulty announced by peers.
    pub fn set_peer_best_difficulty(&self, difficulty: Difficulty) {
        self.0.lock().peer_best = difficulty;
    }

    /// Blocks imported so far, in import order.
    pub fn imported(&self) -> Vec<BlockHash> {
        self.0.lock().imported.clone()
    }
}

impl Chain for FakeChain {
    fn try_connect(&self, block: &Block) -> SyncResult<ImportOutcome> {
        let mut state = self.0.lock();
        let id = block.id();
        if state.known.contains(&id) {
            return Ok(ImportOutcome::Exist);
        }
        if state.invalid.contains(&id) {
            return Ok(ImportOutcome::Invalid);
        }
        if let Some(parent) = parent_of(block) {
            if !state.known.contains(&parent) {
                return Ok(ImportOutcome::NoParent(parent));
            }
        }
        state.known.insert(id);
        state.imported.push(id);
        state.difficulty = Difficulty(state.difficulty.0 + 1);
        Ok(ImportOutcome::ImportedBest)
    }

    fn current_max_difficulty(&self) -> Difficulty {
        self.0.lock().difficulty
    }

    fn peer_best_known_difficulty(&self) -> Difficulty {
        self.0.lock().peer_best
    }

    fn clone_box(&self) -> Box<dyn Chain> {
        Box::new(self.clone())
    }
}

/// Block store backed by a vector.
#[derive(Clone, Default)]
pub struct MemoryBlockStore(Arc<RwLock<Vec<Block>>>);

impl MemoryBlockStore {
    /// empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `block`.
    pub fn insert(&self, block: Block) {
        self.0.write().push(block);
    }
}

impl BlockStore for MemoryBlockStore {
    fn load_digest(&self, start: DagTime, end: DagTime) -> SyncResult<RangeDigest> {
        let blocks = self.0.read();
        Ok(RangeDigest::for_range(
            start,
            end,
            blocks
                .iter()
                .map(|block| (block.timestamp(), block.raw().sum(), RAW_BLOCK_SIZE as u64)),
        )?)
    }

    fn blocks_in_range(&self, start: DagTime, end: DagTime) -> SyncResult<Vec<Block>> {
        let mut blocks: Vec<Block> = self
            .0
            .read()
            .iter()
            .filter(|block| block.timestamp() >= start && block.timestamp() < end)
            .cloned()
            .collect();
        blocks.sort_by_key(|block| block.timestamp());
        Ok(blocks)
    }

    fn get_block(&self, hash: &BlockHash) -> SyncResult<Option<Block>> {
        Ok(self.0.read().iter().find(|block| block.id() == *hash).cloned())
    }

    fn clone_box(&self) -> Box<dyn BlockStore> {
        Box::new(self.clone())
    }
}

#[derive(Default)]
struct FakePeersState {
    connections: HashMap<PeerId, Sender<SyncMessage>>,
    dropped: Vec<PeerId>,
}

/// Connected peers whose outgoing messages land in crossbeam channels.
#[derive(Clone, Default)]
pub struct FakePeers(Arc<RwLock<FakePeersState>>);

impl FakePeers {
    /// no peer connected
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect `peer_id` and return what the node sends to it.
    pub fn create_fake_connection(&self, peer_id: PeerId) -> Receiver<SyncMessage> {
        let (sender, receiver) = unbounded();
        self.0.write().connections.insert(peer_id, sender);
        receiver
    }

    /// Peers dropped by the node, in order.
    pub fn dropped(&self) -> Vec<PeerId> {
        self.0.read().dropped.clone()
    }
}

impl ActivePeers for FakePeers {
    fn active_peers(&self) -> Vec<PeerId> {
        let mut peers: Vec<PeerId> = self.0.read().connections.keys().copied().collect();
        peers.sort();
        peers
    }

    fn send_to_peer(&self, peer_id: &PeerId, message: SyncMessage) -> SyncResult<()> {
        let state = self.0.read();
        let sender = state
            .connections
            .get(peer_id)
            .ok_or(SyncError::UnknownPeer(*peer_id))?;
        sender
            .send(message)
            .map_err(|err| SyncError::PeerSendError(*peer_id, err.to_string()))
    }

    fn drop_peer(&self, peer_id: &PeerId) {
        let mut state = self.0.write();
        state.connections.remove(peer_id);
        state.dropped.push(*peer_id);
    }

    fn clone_box(&self) -> Box<dyn ActivePeers> {
        Box::new(self.clone())
    }
}
