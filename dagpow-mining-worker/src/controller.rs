// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! This module implements a mining controller.
//! See `dagpow-mining-exports/controller_traits.rs` for functional details.

use std::sync::Arc;

use dagpow_hash::hash::Hash;
use dagpow_mining_exports::{MiningController, MiningResult, ProducerState, ProducerStats};
use dagpow_models::{ChannelId, Difficulty, Share};

use crate::{event::ProducerEvent, worker::ProducerShared};

#[derive(Clone)]
/// implementation of the mining controller
pub struct MiningControllerImpl {
    pub(crate) shared: Arc<ProducerShared>,
}

impl MiningController for MiningControllerImpl {
    fn start(&self) -> MiningResult<()> {
        self.shared.start()
    }

    fn receive_share(&self, channel: ChannelId, share: Share) {
        if self.shared.state() != ProducerState::Running {
            return;
        }
        self.shared
            .push_event(ProducerEvent::NewShare { channel, share });
    }

    fn receive_new_pretop(&self, tip: Hash) {
        if self.shared.state() != ProducerState::Running {
            return;
        }
        {
            let mut last = self.shared.last_pretop.lock();
            if *last == Some(tip) {
                return;
            }
            *last = Some(tip);
        }
        self.shared.push_event(ProducerEvent::NewPretop { tip });
    }

    fn receive_new_diff(&self, difficulty: Difficulty) {
        if self.shared.state() == ProducerState::Stopped {
            return;
        }
        self.shared
            .push_event(ProducerEvent::NewDiff { value: difficulty });
    }

    fn state(&self) -> ProducerState {
        self.shared.state()
    }

    fn get_stats(&self) -> ProducerStats {
        self.shared.stats.read().clone()
    }

    fn clone_box(&self) -> Box<dyn MiningController> {
        Box::new(self.clone())
    }
}
