// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Definition and exports of the block producer types, errors and
//! collaborator interfaces.
//!
//! The producer seals one block per main period: it hands a task to the
//! miners, keeps the best share they return and broadcasts the sealed block
//! when the period ends.

#![warn(missing_docs)]

mod collaborators;
mod controller_traits;
mod error;
mod settings;
mod types;

pub use collaborators::{AwardManager, BlockTemplateProvider, MinerNotifier};
pub use controller_traits::{MiningController, MiningManager};
pub use error::{MiningError, MiningResult};
pub use settings::MiningConfig;
pub use types::{ChannelStats, MiningChannels, ProducerState, ProducerStats};

#[cfg(any(test, feature = "test-exports"))]
pub use collaborators::{MockAwardManager, MockBlockTemplateProvider, MockMinerNotifier};
#[cfg(any(test, feature = "test-exports"))]
pub use controller_traits::MockMiningController;

/// Tests utils
#[cfg(any(test, feature = "test-exports"))]
pub mod test_exports;
