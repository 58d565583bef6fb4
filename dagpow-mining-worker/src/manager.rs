// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! This module implements a mining manager.
//! See `dagpow-mining-exports/controller_traits.rs` for functional details.

use std::sync::Arc;

use dagpow_mining_exports::MiningManager;
use tracing::info;

use crate::worker::ProducerShared;

/// Implementation of the mining manager
/// Allows stopping the producer threads
pub struct MiningManagerImpl {
    pub(crate) shared: Arc<ProducerShared>,
}

impl MiningManager for MiningManagerImpl {
    /// stops the worker
    fn stop(&mut self) {
        info!("stopping block producer...");
        self.shared.stop();
        info!("block producer stopped");
    }
}
