// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Chain admission: imports, orphan buffering and cascading resolution.

use std::{collections::VecDeque, time::Instant};

use dagpow_logging::dagpow_trace;
use dagpow_models::{BlockHash, BlockWrapper, ImportOutcome, PeerId};
use dagpow_sync_exports::{SyncMessage, SyncResult};
use tracing::{debug, warn};

use crate::{context::SyncContext, pending::PendingByParent};

impl SyncContext {
    /// Admit `wrapper` into the chain.
    ///
    /// The admission lock is held for the import and the whole cascade of
    /// orphans it unlocks, so concurrent callers see each cascade as one step.
    pub(crate) fn validate_and_add(&self, wrapper: BlockWrapper) -> SyncResult<ImportOutcome> {
        let mut pending = self.admission.lock();
        let outcome = self.import_block(&wrapper)?;
        let id = wrapper.block.id();
        match outcome {
            ImportOutcome::ImportedBest | ImportOutcome::ImportedNotBest => {
                self.resolve_pending(&mut pending, id);
            }
            ImportOutcome::NoParent(missing) => {
                debug!("block {} waits for parent {}", id, missing);
                self.buffer_orphan(&mut pending, missing, wrapper);
            }
            ImportOutcome::Invalid => {
                warn!("dropping invalid block {}", id);
            }
            ImportOutcome::Exist => {
                debug!("block {} already known", id);
            }
        }
        Ok(outcome)
    }

    /// Connect one block and apply the sync state side effects of a
    /// successful import.
    fn import_block(&self, wrapper: &BlockWrapper) -> SyncResult<ImportOutcome> {
        let was_done = self.status.is_done();
        let outcome = self.chain.try_connect(&wrapper.block)?;
        dagpow_trace!("sync.import_block", {
            "block": wrapper.block.id().to_string(),
            "outcome": format!("{:?}", outcome),
            "ttl": wrapper.ttl
        });
        if !outcome.is_imported() {
            return Ok(outcome);
        }
        if !was_done {
            if self.chain.current_max_difficulty() >= self.chain.peer_best_known_difficulty() {
                self.make_sync_done();
            }
        } else if let Some(origin) = wrapper.origin_peer {
            if let Some(ttl) = wrapper.relay_ttl() {
                self.relay(wrapper, origin, ttl);
            }
        }
        Ok(outcome)
    }

    /// Replay, breadth first, every orphan unlocked by the import of `imported`.
    fn resolve_pending(&self, pending: &mut PendingByParent, imported: BlockHash) {
        let mut parents = VecDeque::from([imported]);
        while let Some(parent) = parents.pop_front() {
            for child in pending.take(&parent) {
                let id = child.block.id();
                match self.import_block(&child) {
                    Ok(ImportOutcome::ImportedBest | ImportOutcome::ImportedNotBest) => {
                        parents.push_back(id);
                    }
                    Ok(ImportOutcome::NoParent(missing)) => {
                        self.buffer_orphan(pending, missing, child);
                    }
                    Ok(ImportOutcome::Invalid) => {
                        warn!("dropping invalid pending block {}", id);
                    }
                    Ok(ImportOutcome::Exist) => {
                        debug!("pending block {} already known", id);
                    }
                    Err(err) => {
                        warn!("could not import pending block {}: {}", id, err);
                    }
                }
            }
        }
    }

    fn buffer_orphan(&self, pending: &mut PendingByParent, missing: BlockHash, wrapper: BlockWrapper) {
        let origin = wrapper.origin_peer;
        if pending.push(missing, wrapper, Instant::now()).should_request() {
            self.request_missing(missing, origin);
        }
    }

    /// Ask for `missing`, from `origin` when it is still connected.
    fn request_missing(&self, missing: BlockHash, origin: Option<PeerId>) {
        let active = self.peers.active_peers();
        let targets = match origin {
            Some(origin) if active.contains(&origin) => vec![origin],
            _ => active,
        };
        dagpow_trace!("sync.request_block", {
            "block": missing.to_string(),
            "peers": targets.len()
        });
        for peer in targets {
            let message = SyncMessage::BlockRequest { hash: missing };
            if let Err(err) = self.peers.send_to_peer(&peer, message) {
                debug!("could not ask {} for block {}: {}", peer, missing, err);
            }
        }
    }

    /// Forward an imported block to every peer but the one it came from.
    fn relay(&self, wrapper: &BlockWrapper, origin: PeerId, ttl: u8) {
        let raw_block = wrapper.block.raw().as_bytes().to_vec();
        for peer in self.peers.active_peers() {
            if peer == origin {
                continue;
            }
            let message = SyncMessage::NewBlock {
                raw_block: raw_block.clone(),
                ttl,
            };
            if let Err(err) = self.peers.send_to_peer(&peer, message) {
                debug!("could not relay block {} to {}: {}", wrapper.block.id(), peer, err);
            }
        }
    }
}
