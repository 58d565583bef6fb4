// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::{ActivePeers, BlockStore, Chain};

/// Collaborators the sync worker talks to
#[derive(Clone)]
pub struct SyncChannels {
    /// block DAG
    pub chain: Box<dyn Chain>,
    /// block storage
    pub store: Box<dyn BlockStore>,
    /// connected peers
    pub peers: Box<dyn ActivePeers>,
}
