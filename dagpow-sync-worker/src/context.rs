// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::{sync::Arc, time::Instant};

use dagpow_channel::sender::DagSender;
use dagpow_models::SyncStatus;
use dagpow_sync_exports::{ActivePeers, BlockStore, Chain, SyncChannels, SyncConfig, SyncEvent};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::{pending::PendingByParent, requests::OutstandingRequests};

/// State shared by the controller handles and the sync thread.
///
/// `admission` is the single lock around chain admission: it is held for a
/// whole `validate_and_add` including the cascade it triggers.
pub(crate) struct SyncContext {
    pub(crate) cfg: SyncConfig,
    pub(crate) chain: Box<dyn Chain>,
    pub(crate) store: Box<dyn BlockStore>,
    pub(crate) peers: Box<dyn ActivePeers>,
    pub(crate) status: Arc<SyncStatus>,
    pub(crate) admission: Mutex<PendingByParent>,
    pub(crate) requests: Mutex<OutstandingRequests>,
    pub(crate) event_sender: DagSender<SyncEvent>,
    pub(crate) started_at: Instant,
}

impl SyncContext {
    pub(crate) fn new(
        cfg: SyncConfig,
        channels: SyncChannels,
        status: Arc<SyncStatus>,
        event_sender: DagSender<SyncEvent>,
    ) -> Self {
        let pending = PendingByParent::new(
            cfg.max_pending_parents,
            cfg.pending_eviction_batch,
            cfg.pending_rerequest_delay,
        );
        SyncContext {
            chain: channels.chain,
            store: channels.store,
            peers: channels.peers,
            status,
            admission: Mutex::new(pending),
            requests: Mutex::new(OutstandingRequests::default()),
            event_sender,
            started_at: Instant::now(),
            cfg,
        }
    }

    /// One-shot transition to `Done`, announced on the event channel.
    pub(crate) fn make_sync_done(&self) {
        if !self.status.mark_done() {
            return;
        }
        info!("sync done");
        if let Err(err) = self.event_sender.try_send(SyncEvent::SyncDone) {
            warn!("could not announce sync done: {}", err);
        }
    }
}
