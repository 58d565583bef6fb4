// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! This module implements a sync controller.
//! See `dagpow-sync-exports/controller_traits.rs` for functional details.

use std::{sync::Arc, thread::JoinHandle, time::Duration};

use dagpow_channel::{join_with_timeout, sender::DagSender};
use dagpow_models::{Block, BlockWrapper, ImportOutcome, PeerId, SyncState};
use dagpow_sync_exports::{SyncController, SyncManager, SyncMessage, SyncResult};
use tracing::{info, warn};

use crate::{context::SyncContext, worker::SyncCommand};

#[derive(Clone)]
/// implementation of the sync controller
pub struct SyncControllerImpl {
    pub(crate) ctx: Arc<SyncContext>,
}

impl SyncController for SyncControllerImpl {
    fn validate_and_add(&self, wrapper: BlockWrapper) -> SyncResult<ImportOutcome> {
        self.ctx.validate_and_add(wrapper)
    }

    fn on_message(&self, peer: PeerId, message: SyncMessage) {
        match message {
            SyncMessage::SumsRequest {
                start_time,
                end_time,
                nonce,
            } => self.ctx.on_sums_request(peer, start_time, end_time, nonce),
            SyncMessage::SumsReply {
                end_time,
                nonce,
                digest,
            } => self.ctx.on_digest_reply(peer, end_time, nonce, digest),
            SyncMessage::BlocksRequest {
                start_time,
                end_time,
                nonce,
            } => self.ctx.on_blocks_request(peer, start_time, end_time, nonce),
            SyncMessage::BlocksReply {
                ack,
                end_time,
                nonce,
            } => self.ctx.on_blocks_reply(peer, ack, end_time, nonce),
            SyncMessage::BlockRequest { hash } => self.ctx.on_block_request(peer, hash),
            SyncMessage::NewBlock { raw_block, ttl } => match Block::from_bytes(&raw_block) {
                Ok(block) => {
                    if let Err(err) = self
                        .ctx
                        .validate_and_add(BlockWrapper::from_peer(block, ttl, peer))
                    {
                        warn!("could not add block from {}: {}", peer, err);
                    }
                }
                Err(err) => {
                    warn!("malformed block from {}, dropping peer: {}", peer, err);
                    self.ctx.peers.drop_peer(&peer);
                }
            },
        }
    }

    fn sync_state(&self) -> SyncState {
        self.ctx.status.state()
    }

    fn pending_count(&self) -> usize {
        self.ctx.admission.lock().len()
    }

    fn clone_box(&self) -> Box<dyn SyncController> {
        Box::new(self.clone())
    }
}

/// Implementation of the sync manager
/// Allows stopping the sync worker
pub struct SyncManagerImpl {
    /// handle used to join the worker thread
    pub(crate) thread_handle: Option<JoinHandle<()>>,
    /// sender used to stop the worker
    pub(crate) command_sender: DagSender<SyncCommand>,
    pub(crate) stop_timeout: Duration,
}

impl SyncManager for SyncManagerImpl {
    /// stops the worker
    fn stop(&mut self) {
        info!("stopping sync worker...");
        if let Err(err) = self.command_sender.send(SyncCommand::Stop) {
            warn!("sync worker already gone: {}", err);
        }
        if let Some(join_handle) = self.thread_handle.take() {
            join_with_timeout(join_handle, self.stop_timeout);
        }
        info!("sync worker stopped");
    }
}
