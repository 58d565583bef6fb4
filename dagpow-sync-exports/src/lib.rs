// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Definition and exports of the synchronization types, errors and
//! collaborator interfaces.
//!
//! The sync worker admits blocks into the chain, buffers orphans until their
//! parent arrives and reconciles history with peers by comparing range
//! digests.

#![warn(missing_docs)]

mod collaborators;
mod controller_traits;
mod error;
mod events;
mod messages;
mod settings;
mod types;

pub use collaborators::{ActivePeers, BlockStore, Chain};
pub use controller_traits::{SyncController, SyncManager};
pub use error::{SyncError, SyncResult};
pub use events::SyncEvent;
pub use messages::SyncMessage;
pub use settings::SyncConfig;
pub use types::SyncChannels;

#[cfg(any(test, feature = "test-exports"))]
pub use collaborators::{MockActivePeers, MockBlockStore, MockChain};
#[cfg(any(test, feature = "test-exports"))]
pub use controller_traits::MockSyncController;

/// Tests utils
#[cfg(any(test, feature = "test-exports"))]
pub mod test_exports;
