// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::{sync::Arc, thread::JoinHandle};

use crossbeam::channel::Sender;
use dagpow_channel::{join_with_timeout, sender::DagSender, DagChannel};
use dagpow_hash::hash::Hash;
use dagpow_mining_exports::{
    MiningChannels, MiningConfig, MiningController, MiningError, MiningManager, MiningResult,
    ProducerState, ProducerStats,
};
use dagpow_models::SyncStatus;
use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use crate::{
    broadcaster::Broadcaster,
    candidate::CandidateBlock,
    controller::MiningControllerImpl,
    event::ProducerEvent,
    manager::MiningManagerImpl,
    producer::ProducerLoop,
    timer::CycleTimer,
};

/// Threads of a running producer.
pub(crate) struct ProducerThreads {
    event_loop: JoinHandle<()>,
    timer: (Sender<()>, JoinHandle<()>),
    broadcaster: (Sender<()>, JoinHandle<()>),
}

/// State shared by the controller, the manager and the event loop.
pub(crate) struct ProducerShared {
    pub(crate) cfg: MiningConfig,
    pub(crate) channels: MiningChannels,
    pub(crate) status: Arc<SyncStatus>,
    pub(crate) stats: RwLock<ProducerStats>,
    pub(crate) event_sender: RwLock<Option<DagSender<ProducerEvent>>>,
    pub(crate) last_pretop: Mutex<Option<Hash>>,
    threads: Mutex<Option<ProducerThreads>>,
}

impl ProducerShared {
    pub(crate) fn state(&self) -> ProducerState {
        self.stats.read().state
    }

    /// Queue `event` for the loop without blocking.
    pub(crate) fn push_event(&self, event: ProducerEvent) {
        if let Some(sender) = self.event_sender.read().as_ref() {
            if let Err(err) = sender.try_send(event) {
                warn!("producer event dropped: {}", err);
            }
        }
    }

    /// Build the first candidate on the calling thread, dispatch its task,
    /// then spawn the loop, timer and broadcaster threads.
    pub(crate) fn start(self: &Arc<Self>) -> MiningResult<()> {
        let mut threads = self.threads.lock();
        let state = self.state();
        if state != ProducerState::Stopped {
            return Err(MiningError::InvalidState(state));
        }
        let task_index = self.stats.read().task_index.map_or(0, |index| index + 1);
        let (candidate, deadline) =
            CandidateBlock::for_next_cycle(&self.cfg, &*self.channels.template, task_index)?;

        let (event_sender, event_receiver) =
            DagChannel::new("producer_events".to_string(), Some(self.cfg.event_queue_size));
        let timer = CycleTimer::default();
        timer.set_deadline(deadline);
        let timer_thread = timer.spawn(self.cfg.timer_poll_interval, event_sender.clone());
        let (broadcaster, broadcast_stop, broadcast_handle) = Broadcaster::spawn(
            self.cfg.broadcast_queue_size,
            self.cfg.block_ttl,
            self.channels.peers.clone(),
        );

        let initial_state = if self.status.is_done() {
            ProducerState::Running
        } else {
            ProducerState::Syncing
        };
        {
            let mut stats = self.stats.write();
            stats.state = initial_state;
            stats.task_index = Some(task_index);
            stats.best_hash = Some(candidate.best_hash());
            stats.best_share_window = vec![None; stats.best_share_window.len()];
        }
        *self.last_pretop.lock() = None;
        *self.event_sender.write() = Some(event_sender);
        self.channels.notifier.send_task(candidate.task());
        info!(
            "block producer started in {:?}, task {} until {}",
            initial_state, task_index, deadline
        );

        let producer = ProducerLoop::new(
            self.clone(),
            event_receiver,
            timer,
            broadcaster,
            candidate,
            deadline,
        );
        let event_loop = std::thread::Builder::new()
            .name("mining-loop".into())
            .spawn(move || producer.run())
            .expect("could not spawn mining loop thread");

        *threads = Some(ProducerThreads {
            event_loop,
            timer: timer_thread,
            broadcaster: (broadcast_stop, broadcast_handle),
        });
        Ok(())
    }

    /// Move to `Stopped` and join every producer thread within the stop timeout.
    pub(crate) fn stop(&self) {
        let threads = self.threads.lock().take();
        self.stats.write().state = ProducerState::Stopped;
        let event_sender = self.event_sender.write().take();
        let Some(threads) = threads else {
            return;
        };
        if let Some(sender) = event_sender {
            if let Err(err) = sender.send_timeout(ProducerEvent::Stop, self.cfg.stop_timeout) {
                warn!("could not send stop to the mining loop: {}", err);
            }
        }
        let (timer_stop, timer_handle) = threads.timer;
        drop(timer_stop);
        join_with_timeout(timer_handle, self.cfg.stop_timeout);
        let (broadcast_stop, broadcast_handle) = threads.broadcaster;
        drop(broadcast_stop);
        join_with_timeout(broadcast_handle, self.cfg.stop_timeout);
        join_with_timeout(threads.event_loop, self.cfg.stop_timeout);
    }
}

/// Creates a block producer in the `Stopped` state.
///
/// # Arguments
/// * `cfg`: producer configuration
/// * `channels`: template provider, miners, awards, admission path and peers
/// * `status`: process-wide sync flag
///
/// # Returns
/// A pair `(mining_manager, mining_controller)` where the controller starts
/// the producer and feeds it, and the manager stops it.
pub fn start_mining_worker(
    cfg: MiningConfig,
    channels: MiningChannels,
    status: Arc<SyncStatus>,
) -> (Box<dyn MiningManager>, Box<dyn MiningController>) {
    let shared = Arc::new(ProducerShared {
        cfg,
        channels,
        status,
        stats: RwLock::new(ProducerStats::new(ProducerState::Stopped)),
        event_sender: RwLock::new(None),
        last_pretop: Mutex::new(None),
        threads: Mutex::new(None),
    });
    let manager = MiningManagerImpl {
        shared: shared.clone(),
    };
    let controller = MiningControllerImpl { shared };
    (Box::new(manager), Box::new(controller))
}
