// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Range reconciliation: digests are compared 16 sub-ranges at a time and
//! only the disagreeing sub-ranges are asked again, until they are small
//! enough to be fetched as blocks.

use std::{collections::BTreeSet, time::Instant};

use dagpow_logging::dagpow_trace;
use dagpow_models::{config::RANGE_DIGEST_SLOTS, sub_range_step, PeerId, RangeDigest};
use dagpow_sync_exports::SyncMessage;
use dagpow_time::DagTime;
use tracing::{debug, info, warn};

use crate::{
    context::SyncContext,
    requests::{OutstandingRequest, RequestKind},
};

impl SyncContext {
    /// Periodic work of the sync thread.
    pub(crate) fn on_sync_tick(&self) {
        if !self.status.is_done() && self.started_at.elapsed() >= self.cfg.sync_done_wait {
            info!(
                "no peer ahead of us after {:?}, considering the node synced",
                self.cfg.sync_done_wait
            );
            self.make_sync_done();
        }
        self.sweep_requests(Instant::now());
        if !self.status.is_done() {
            self.run_cycle();
        }
    }

    /// Ask every active peer for the digest of the whole history.
    pub(crate) fn run_cycle(&self) {
        let peers = self.peers.active_peers();
        debug!(
            "range sync cycle with {} peers, {} requests outstanding",
            peers.len(),
            self.requests.lock().len()
        );
        for peer in peers {
            self.request_sums(&peer, DagTime::ZERO, self.cfg.full_sync_span);
        }
    }

    /// Compare a peer digest with ours and dig into the sub-ranges that differ.
    pub(crate) fn on_digest_reply(
        &self,
        peer: PeerId,
        end: DagTime,
        nonce: u64,
        remote: RangeDigest,
    ) {
        let request = self
            .requests
            .lock()
            .take_matching(nonce, &peer, end, RequestKind::Sums);
        let Some(request) = request else {
            debug!("ignoring unmatched sums reply {} from {}", nonce, peer);
            return;
        };
        // answered, so the peer is not dropped, but nothing more is requested
        if self.status.is_done() {
            debug!("sync done, ignoring sums reply from {}", peer);
            return;
        }
        let local = match self.store.load_digest(request.start, request.end) {
            Ok(digest) => digest,
            Err(err) => {
                warn!(
                    "could not load digest of [{}, {}): {}",
                    request.start, request.end, err
                );
                return;
            }
        };
        let step = match sub_range_step(request.start, request.end) {
            Ok(step) => step,
            Err(err) => {
                warn!("cannot split range answered by {}: {}", peer, err);
                return;
            }
        };
        for index in local.differing_slots(&remote) {
            let sub_start = request.start.saturating_add(step.saturating_mul(index as u64));
            let sub_end = if index + 1 == RANGE_DIGEST_SLOTS {
                request.end
            } else {
                sub_start.saturating_add(step)
            };
            if step > self.cfg.max_blocks_request_span {
                self.request_sums(&peer, sub_start, sub_end);
            } else {
                self.request_blocks(&peer, sub_start, sub_end);
            }
        }
    }

    pub(crate) fn on_blocks_reply(&self, peer: PeerId, ack: bool, end: DagTime, nonce: u64) {
        let request = self
            .requests
            .lock()
            .take_matching(nonce, &peer, end, RequestKind::Blocks);
        match request {
            Some(request) if !ack => {
                debug!(
                    "{} refused blocks of [{}, {})",
                    peer, request.start, request.end
                );
            }
            Some(_) => {}
            None => debug!("ignoring unmatched blocks reply {} from {}", nonce, peer),
        }
    }

    fn request_sums(&self, peer: &PeerId, start: DagTime, end: DagTime) {
        let nonce = self.register_request(peer, RequestKind::Sums, start, end);
        let message = SyncMessage::SumsRequest {
            start_time: start,
            end_time: end,
            nonce,
        };
        self.send_request(peer, message);
    }

    fn request_blocks(&self, peer: &PeerId, start: DagTime, end: DagTime) {
        let nonce = self.register_request(peer, RequestKind::Blocks, start, end);
        let message = SyncMessage::BlocksRequest {
            start_time: start,
            end_time: end,
            nonce,
        };
        self.send_request(peer, message);
    }

    /// Record a request under a fresh random nonce.
    fn register_request(
        &self,
        peer: &PeerId,
        kind: RequestKind,
        start: DagTime,
        end: DagTime,
    ) -> u64 {
        let mut requests = self.requests.lock();
        let mut nonce: u64 = rand::random();
        while requests.contains(nonce) {
            nonce = rand::random();
        }
        requests.insert(
            nonce,
            OutstandingRequest {
                peer: *peer,
                kind,
                start,
                end,
                deadline: Instant::now() + self.cfg.request_timeout,
            },
        );
        nonce
    }

    fn send_request(&self, peer: &PeerId, message: SyncMessage) {
        dagpow_trace!("sync.send_request", {
            "peer": peer.to_string(),
            "kind": message.kind()
        });
        if let Err(err) = self.peers.send_to_peer(peer, message) {
            warn!("request to {} failed, dropping peer: {}", peer, err);
            self.drop_peer(peer);
        }
    }

    /// Drop the peers of every request past its deadline.
    fn sweep_requests(&self, now: Instant) {
        let expired = self.requests.lock().expired(now);
        let mut timed_out = BTreeSet::new();
        for request in expired {
            warn!(
                "{:?} request for [{}, {}) to {} timed out",
                request.kind, request.start, request.end, request.peer
            );
            timed_out.insert(request.peer);
        }
        for peer in timed_out {
            self.drop_peer(&peer);
        }
    }

    fn drop_peer(&self, peer: &PeerId) {
        self.requests.lock().remove_peer(peer);
        self.peers.drop_peer(peer);
    }
}
