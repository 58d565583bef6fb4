// Copyright (c) 2022 MASSA LABS <info@massa.net>

use dagpow_models::{config::BLOCKS_REPLY_TTL, BlockHash, PeerId};
use dagpow_sync_exports::SyncMessage;
use dagpow_time::DagTime;
use tracing::{debug, warn};

use crate::context::SyncContext;

impl SyncContext {
    pub(crate) fn on_sums_request(&self, peer: PeerId, start: DagTime, end: DagTime, nonce: u64) {
        let digest = match self.store.load_digest(start, end) {
            Ok(digest) => digest,
            Err(err) => {
                warn!("cannot serve sums of [{}, {}) to {}: {}", start, end, peer, err);
                return;
            }
        };
        let reply = SyncMessage::SumsReply {
            end_time: end,
            nonce,
            digest,
        };
        if let Err(err) = self.peers.send_to_peer(&peer, reply) {
            debug!("could not send sums reply to {}: {}", peer, err);
        }
    }

    /// Send the blocks of `[start, end)` one by one, then the acknowledgement.
    pub(crate) fn on_blocks_request(
        &self,
        peer: PeerId,
        start: DagTime,
        end: DagTime,
        nonce: u64,
    ) {
        let ack = match self.store.blocks_in_range(start, end) {
            Ok(blocks) => {
                debug!("sending {} blocks of [{}, {}) to {}", blocks.len(), start, end, peer);
                for block in blocks {
                    let message = SyncMessage::NewBlock {
                        raw_block: block.raw().as_bytes().to_vec(),
                        ttl: BLOCKS_REPLY_TTL,
                    };
                    if let Err(err) = self.peers.send_to_peer(&peer, message) {
                        debug!("stopped serving blocks to {}: {}", peer, err);
                        return;
                    }
                }
                true
            }
            Err(err) => {
                warn!("cannot serve blocks of [{}, {}) to {}: {}", start, end, peer, err);
                false
            }
        };
        let reply = SyncMessage::BlocksReply {
            ack,
            end_time: end,
            nonce,
        };
        if let Err(err) = self.peers.send_to_peer(&peer, reply) {
            debug!("could not send blocks reply to {}: {}", peer, err);
        }
    }

    pub(crate) fn on_block_request(&self, peer: PeerId, hash: BlockHash) {
        match self.store.get_block(&hash) {
            Ok(Some(block)) => {
                let message = SyncMessage::NewBlock {
                    raw_block: block.raw().as_bytes().to_vec(),
                    ttl: self.cfg.block_ttl,
                };
                if let Err(err) = self.peers.send_to_peer(&peer, message) {
                    debug!("could not send block {} to {}: {}", hash, peer, err);
                }
            }
            Ok(None) => debug!("{} asked for unknown block {}", peer, hash),
            Err(err) => warn!("cannot load block {} for {}: {}", hash, peer, err),
        }
    }
}
