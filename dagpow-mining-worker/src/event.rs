// Copyright (c) 2022 MASSA LABS <info@massa.net>

use dagpow_hash::hash::Hash;
use dagpow_models::{ChannelId, Difficulty, Share};
use dagpow_time::DagTime;

/// Inputs of the producer event loop, consumed in arrival order.
#[derive(Debug, Clone)]
pub(crate) enum ProducerEvent {
    Stop,
    /// the cycle armed for `deadline` is over
    Timeout {
        deadline: DagTime,
    },
    NewShare {
        channel: ChannelId,
        share: Share,
    },
    /// a competing tip with more cumulative difficulty was seen
    NewPretop {
        tip: Hash,
    },
    NewDiff {
        value: Difficulty,
    },
}
