// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::sync::Arc;

use dagpow_channel::receiver::DagReceiver;
use dagpow_hash::hash::Hash;
use dagpow_logging::dagpow_trace;
use dagpow_mining_exports::ProducerState;
use dagpow_models::{BlockWrapper, ChannelId, Difficulty, ImportOutcome, Share};
use dagpow_time::DagTime;
use tracing::{debug, info, warn};

use crate::{
    broadcaster::Broadcaster,
    candidate::{next_deadline, CandidateBlock},
    event::ProducerEvent,
    timer::CycleTimer,
    window::BestShareWindow,
    worker::ProducerShared,
};

/// Single consumer of the producer events, sole owner of the candidate.
pub(crate) struct ProducerLoop {
    shared: Arc<ProducerShared>,
    events: DagReceiver<ProducerEvent>,
    timer: CycleTimer,
    broadcaster: Broadcaster,
    /// `None` when the last cycle could not build a template
    candidate: Option<CandidateBlock>,
    deadline: DagTime,
    next_task_index: u64,
    window: BestShareWindow,
}

impl ProducerLoop {
    pub(crate) fn new(
        shared: Arc<ProducerShared>,
        events: DagReceiver<ProducerEvent>,
        timer: CycleTimer,
        broadcaster: Broadcaster,
        candidate: CandidateBlock,
        deadline: DagTime,
    ) -> Self {
        let mut window = BestShareWindow::default();
        window.open(BestShareWindow::slot_for(deadline, shared.cfg.main_period));
        ProducerLoop {
            next_task_index: candidate.task().task_index + 1,
            candidate: Some(candidate),
            shared,
            events,
            timer,
            broadcaster,
            deadline,
            window,
        }
    }

    /// Process events until `Stop`, or until every sender is gone.
    pub(crate) fn run(mut self) {
        loop {
            let event = match self.events.recv() {
                Ok(event) => event,
                Err(_) => break,
            };
            self.events.update_metrics();
            match event {
                ProducerEvent::Stop => break,
                ProducerEvent::Timeout { deadline } => self.on_timeout(deadline),
                ProducerEvent::NewShare { channel, share } => self.on_share(channel, share),
                ProducerEvent::NewPretop { tip } => self.on_pretop(tip),
                ProducerEvent::NewDiff { value } => self.on_new_diff(value),
            }
        }
        debug!("mining loop exiting");
    }

    fn on_timeout(&mut self, deadline: DagTime) {
        if deadline != self.deadline {
            debug!("ignoring timeout of abandoned cycle {}", deadline);
            return;
        }
        match self.shared.state() {
            ProducerState::Running => {
                self.seal();
                self.begin_cycle();
            }
            ProducerState::Syncing => {
                if self.shared.status.is_done() {
                    let mut stats = self.shared.stats.write();
                    if stats.state == ProducerState::Syncing {
                        info!("node synced, block producer now sealing blocks");
                        stats.state = ProducerState::Running;
                    }
                }
                self.begin_cycle();
            }
            ProducerState::Stopped => {}
        }
    }

    fn on_share(&mut self, channel: ChannelId, share: Share) {
        if self.shared.state() != ProducerState::Running {
            return;
        }
        let Some(candidate) = self.candidate.as_mut() else {
            return;
        };
        let task_time = candidate.task().task_time;
        let current_index = candidate.task().task_index;
        let current = share.task_index == current_index;
        let scored = current.then(|| candidate.offer(&share.nonce));

        let mut stats = self.shared.stats.write();
        let channel_stats = stats.channels.entry(channel).or_default();
        channel_stats.last_share_time = DagTime::now().ok();
        let Some((hash, improved)) = scored else {
            channel_stats.stale += 1;
            debug!(
                "stale share from {} for task {}, current is {}",
                channel, share.task_index, current_index
            );
            return;
        };
        channel_stats.accepted += 1;
        if channel_stats.best_hash.map_or(true, |best| hash < best) {
            channel_stats.best_hash = Some(hash);
        }
        if improved {
            let slot = BestShareWindow::slot_for(task_time, self.shared.cfg.main_period);
            self.window.update(slot, share.nonce, hash);
            stats.best_hash = Some(hash);
            stats.best_share_window = self.window.hashes();
            dagpow_trace!("mining.best_share", {
                "channel": channel.0,
                "task_index": share.task_index,
                "hash": hash.to_string()
            });
        }
    }

    fn on_pretop(&mut self, tip: Hash) {
        if self.shared.state() != ProducerState::Running {
            return;
        }
        debug!("better tip {} seen, restarting the cycle", tip);
        self.begin_cycle();
    }

    fn on_new_diff(&mut self, value: Difficulty) {
        let mut stats = self.shared.stats.write();
        if value > stats.network_difficulty {
            info!("network difficulty is now {}", value);
            stats.network_difficulty = value;
        }
    }

    /// Admit, reward and broadcast the block carrying the best share.
    fn seal(&mut self) {
        let Some(candidate) = self.candidate.take() else {
            return;
        };
        let block = candidate.seal();
        let id = block.id();
        let wrapper = BlockWrapper::local(block.clone(), self.shared.cfg.block_ttl);
        match self.shared.channels.sync.validate_and_add(wrapper) {
            Ok(ImportOutcome::Invalid) => {
                warn!("mined block {} was rejected by the chain", id);
                return;
            }
            Ok(outcome) => debug!("mined block {} admitted as {:?}", id, outcome),
            Err(err) => {
                warn!("could not admit mined block {}: {}", id, err);
                return;
            }
        }
        self.shared.channels.award.add_award_block(
            candidate.best_nonce(),
            *candidate.task().midstate(),
            *block.hash(),
            block.timestamp(),
        );
        dagpow_trace!("mining.sealed", {
            "block": id.to_string(),
            "task_index": candidate.task().task_index
        });
        info!("sealed block {} for task {}", id, candidate.task().task_index);
        self.broadcaster.broadcast(block);
        self.shared.stats.write().blocks_produced += 1;
    }

    /// Build the next candidate, arm its deadline and hand its task to the miners.
    fn begin_cycle(&mut self) {
        let template = &*self.shared.channels.template;
        match CandidateBlock::for_next_cycle(&self.shared.cfg, template, self.next_task_index) {
            Ok((candidate, deadline)) => {
                self.next_task_index += 1;
                self.deadline = deadline;
                self.timer.set_deadline(deadline);
                self.window
                    .open(BestShareWindow::slot_for(deadline, self.shared.cfg.main_period));
                {
                    let mut stats = self.shared.stats.write();
                    stats.task_index = Some(candidate.task().task_index);
                    stats.best_hash = Some(candidate.best_hash());
                    stats.best_share_window = self.window.hashes();
                }
                self.shared.channels.notifier.send_task(candidate.task());
                debug!("task {} until {}", candidate.task().task_index, deadline);
                self.candidate = Some(candidate);
            }
            Err(err) => {
                warn!("could not build a candidate block: {}", err);
                self.candidate = None;
                // retry at the next period
                match next_deadline(&self.shared.cfg) {
                    Ok(deadline) => {
                        self.deadline = deadline;
                        self.timer.set_deadline(deadline);
                    }
                    Err(err) => warn!("could not compute the next deadline: {}", err),
                }
            }
        }
    }
}
