// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Data types shared by the block producer and the synchronization engine.

#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

pub use block::{Block, BlockHash, RawBlock};
pub use digest::{sub_range_step, RangeDigest};
pub use error::{ModelsError, ModelsResult};
pub use import::ImportOutcome;
pub use peer::{Difficulty, PeerId};
pub use sync_status::{SyncState, SyncStatus};
pub use task::{ChannelId, Share, Task};
pub use wrapper::BlockWrapper;

mod block;
/// default values of the worker configurations
pub mod config;
mod digest;
/// models error
pub mod error;
mod import;
mod peer;
mod sync_status;
mod task;
mod wrapper;

#[cfg(any(test, feature = "test-exports"))]
/// helpers building blocks for tests
pub mod test_exports;
