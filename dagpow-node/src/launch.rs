// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::{sync::Arc, thread::JoinHandle, time::Duration};

use crossbeam::channel::{bounded, select, Sender};
use dagpow_channel::join_with_timeout;
use dagpow_mining_exports::{
    AwardManager, BlockTemplateProvider, MinerNotifier, MiningChannels, MiningConfig,
    MiningController, MiningManager,
};
use dagpow_mining_worker::start_mining_worker;
use dagpow_models::SyncStatus;
use dagpow_sync_exports::{
    ActivePeers, BlockStore, Chain, SyncChannels, SyncConfig, SyncController, SyncEvent,
    SyncManager,
};
use dagpow_sync_worker::start_sync_worker;
use tracing::{debug, info, warn};

use crate::Settings;

/// Node subsystems the producer and the sync worker talk to.
pub struct NodeCollaborators {
    /// block DAG
    pub chain: Box<dyn Chain>,
    /// block storage
    pub store: Box<dyn BlockStore>,
    /// connected peers
    pub peers: Box<dyn ActivePeers>,
    /// candidate block builder
    pub template: Box<dyn BlockTemplateProvider>,
    /// miner task dispatch
    pub notifier: Box<dyn MinerNotifier>,
    /// reward bookkeeping
    pub award: Box<dyn AwardManager>,
}

/// Controllers of a launched node and the handles needed to stop it.
pub struct NodeHandles {
    /// admission path and inbound sync messages
    pub sync_controller: Box<dyn SyncController>,
    /// shares, pretops and difficulty updates
    pub mining_controller: Box<dyn MiningController>,
    /// process-wide sync flag
    pub status: Arc<SyncStatus>,
    sync_manager: Box<dyn SyncManager>,
    mining_manager: Box<dyn MiningManager>,
    event_thread: Option<(Sender<()>, JoinHandle<()>)>,
    stop_timeout: Duration,
}

impl NodeHandles {
    /// Stop the event thread, then the producer, then the sync worker.
    ///
    /// The event thread goes first so a late `SyncDone` cannot restart a
    /// stopped producer.
    pub fn stop(mut self) {
        if let Some((stop_sender, handle)) = self.event_thread.take() {
            drop(stop_sender);
            join_with_timeout(handle, self.stop_timeout);
        }
        info!("stopping the block producer");
        self.mining_manager.stop();
        info!("stopping the sync worker");
        self.sync_manager.stop();
        info!("node stopped");
    }
}

/// Start the sync worker and create the producer, which is started on the
/// first `SyncDone`.
pub fn launch(settings: &Settings, collaborators: NodeCollaborators) -> NodeHandles {
    let mining_config = MiningConfig::from(&settings.mining);
    let sync_config = SyncConfig::from(&settings.sync);
    let stop_timeout = sync_config.stop_timeout.max(mining_config.stop_timeout);
    let status = Arc::new(SyncStatus::new());

    let (sync_manager, sync_controller, sync_events) = start_sync_worker(
        sync_config,
        SyncChannels {
            chain: collaborators.chain,
            store: collaborators.store,
            peers: collaborators.peers.clone(),
        },
        status.clone(),
    );
    let (mining_manager, mining_controller) = start_mining_worker(
        mining_config,
        MiningChannels {
            template: collaborators.template,
            notifier: collaborators.notifier,
            award: collaborators.award,
            sync: sync_controller.clone(),
            peers: collaborators.peers,
        },
        status.clone(),
    );

    let (stop_sender, stop_receiver) = bounded::<()>(0);
    let producer = mining_controller.clone();
    let handle = std::thread::Builder::new()
        .name("node-events".into())
        .spawn(move || {
            loop {
                select! {
                    recv(stop_receiver) -> _ => break,
                    recv(sync_events) -> event => match event {
                        Ok(SyncEvent::SyncDone) => start_producer(&*producer),
                        Err(_) => break,
                    },
                }
                sync_events.update_metrics();
            }
            debug!("node event thread exiting");
        })
        .expect("could not spawn node event thread");

    NodeHandles {
        sync_controller,
        mining_controller,
        status,
        sync_manager,
        mining_manager,
        event_thread: Some((stop_sender, handle)),
        stop_timeout,
    }
}

fn start_producer(producer: &dyn MiningController) {
    info!("node synced, starting the block producer");
    if let Err(err) = producer.start() {
        warn!("could not start the block producer: {}", err);
    }
}

