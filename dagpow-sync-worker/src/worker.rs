// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::{sync::Arc, time::Instant};

use crossbeam::channel::{at, select};
use dagpow_channel::{receiver::DagReceiver, DagChannel};
use dagpow_models::SyncStatus;
use dagpow_sync_exports::{SyncChannels, SyncConfig, SyncController, SyncEvent, SyncManager};
use tracing::debug;

use crate::{
    context::SyncContext,
    controller::{SyncControllerImpl, SyncManagerImpl},
};

/// Commands accepted by the sync thread
pub(crate) enum SyncCommand {
    Stop,
}

/// Structure gathering all elements needed by the sync thread
struct SyncThread {
    ctx: Arc<SyncContext>,
    command_receiver: DagReceiver<SyncCommand>,
}

impl SyncThread {
    /// Thread loop.
    ///
    /// Ticks once after `sync_start_delay`, then every `sync_interval`,
    /// until a `Stop` command arrives or the manager is dropped.
    fn run(self) {
        let mut next_tick = Instant::now() + self.ctx.cfg.sync_start_delay;
        loop {
            select! {
                recv(self.command_receiver) -> msg => {
                    self.command_receiver.update_metrics();
                    match msg {
                        Ok(SyncCommand::Stop) | Err(_) => break,
                    }
                }
                recv(at(next_tick)) -> _ => {
                    self.ctx.on_sync_tick();
                    next_tick = Instant::now() + self.ctx.cfg.sync_interval;
                }
            }
        }
        debug!("sync thread exiting");
    }
}

/// Launches a sync worker thread and returns the handles to interact with it.
///
/// # Arguments
/// * `cfg`: sync configuration
/// * `channels`: chain, storage and peers
/// * `status`: process-wide sync flag, also read by the block producer
///
/// # Returns
/// `(sync_manager, sync_controller, sync_events)` where the event receiver
/// yields `SyncEvent::SyncDone` once the node caught up.
pub fn start_sync_worker(
    cfg: SyncConfig,
    channels: SyncChannels,
    status: Arc<SyncStatus>,
) -> (
    Box<dyn SyncManager>,
    Box<dyn SyncController>,
    DagReceiver<SyncEvent>,
) {
    let (event_sender, event_receiver) =
        DagChannel::new("sync_events".to_string(), Some(cfg.event_channel_size));
    let (command_sender, command_receiver) = DagChannel::new("sync_worker_command".to_string(), None);
    let stop_timeout = cfg.stop_timeout;
    let ctx = Arc::new(SyncContext::new(cfg, channels, status, event_sender));

    let thread_ctx = ctx.clone();
    let thread_handle = std::thread::Builder::new()
        .name("sync-worker".into())
        .spawn(move || {
            SyncThread {
                ctx: thread_ctx,
                command_receiver,
            }
            .run()
        })
        .expect("could not spawn sync worker thread");

    let manager = SyncManagerImpl {
        thread_handle: Some(thread_handle),
        command_sender,
        stop_timeout,
    };
    let controller = SyncControllerImpl { ctx };
    (Box::new(manager), Box::new(controller), event_receiver)
}
