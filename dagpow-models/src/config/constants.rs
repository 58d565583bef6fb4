// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! DEFAULT VALUES USED TO INITIALIZE THE WORKER CONFIGURATIONS
//!
//! Each worker `Default` config takes its values from this file. They are
//! passed with dependency injection in a `cfg` parameter to each worker,
//! which keeps unit tests free to shrink them.

use std::time::Duration;

use dagpow_time::DagTime;

/// Size of a raw block in bytes
pub const RAW_BLOCK_SIZE: usize = 512;
/// Size of one block field in bytes
pub const FIELD_SIZE: usize = 32;
/// Number of fields of a block
pub const FIELD_COUNT: usize = RAW_BLOCK_SIZE / FIELD_SIZE;
/// Block bytes covered by the miner midstate
pub const MIDSTATE_PREFIX_BYTES: usize = 448;
/// Field holding the last bytes hashed by miners before the nonce
pub const TRAILING_FIELD_INDEX: usize = 14;
/// Field holding the nonce
pub const NONCE_FIELD_INDEX: usize = 15;
/// Size of a miner address in bytes, prefix of every initial nonce
pub const MINER_ADDRESS_SIZE: usize = 20;

/// Size of a range digest in bytes
pub const RANGE_DIGEST_SIZE: usize = 256;
/// Number of sub-ranges summarized by a range digest
pub const RANGE_DIGEST_SLOTS: usize = 16;
/// Size of the summary of one sub-range
pub const RANGE_DIGEST_SLOT_SIZE: usize = RANGE_DIGEST_SIZE / RANGE_DIGEST_SLOTS;

/// Mining cycle length: 2^16 ticks (64 s)
pub const MAIN_PERIOD: DagTime = DagTime::from_ticks(1 << 16);
/// The first deadline is the end of the period containing `now + MIN_CYCLE_LEAD`
pub const MIN_CYCLE_LEAD: DagTime = DagTime::from_ticks(64);
/// Number of slots of the best share window
pub const BEST_SHARE_WINDOW_SLOTS: usize = 16;
/// Polling interval of the cycle timer
pub const TIMER_POLL_INTERVAL: Duration = Duration::from_millis(10);
/// Capacity of the outbound block queue of the broadcaster
pub const BROADCAST_QUEUE_SIZE: usize = 1024;
/// Capacity of the producer event queue
pub const EVENT_QUEUE_SIZE: usize = 4096;
/// Hop count given to freshly mined or requested blocks
pub const BLOCK_TTL: u8 = 5;
/// Hop count of blocks sent in answer to a blocks request
pub const BLOCKS_REPLY_TTL: u8 = 1;

/// Interval between two range sync cycles
pub const SYNC_INTERVAL: Duration = Duration::from_secs(10);
/// Delay before the first range sync cycle
pub const SYNC_START_DELAY: Duration = Duration::from_secs(32);
/// A node that never reaches its peers difficulty declares itself synced after this (2 main periods)
pub const SYNC_DONE_WAIT: Duration = Duration::from_secs(128);
/// Largest span requested directly as blocks instead of digests: 2^20 ticks
pub const REQUEST_BLOCKS_MAX_TIME: DagTime = DagTime::from_ticks(1 << 20);
/// Timeout of an outstanding sums or blocks request
pub const REQUEST_WAIT: Duration = Duration::from_secs(64);
/// Span of the root digest request
pub const FULL_SYNC_SPAN: DagTime = DagTime::from_ticks(1 << 48);
/// Maximum number of missing parents tracked
pub const MAX_PENDING_PARENTS: usize = 500_000;
/// Parents evicted at once when the pending map is full
pub const PENDING_EVICTION_BATCH: usize = 5_000;
/// A duplicate orphan re-triggers its parent request once this has elapsed
pub const PENDING_REREQUEST_DELAY: Duration = Duration::from_secs(64);
/// Capacity of the sync event channel
pub const SYNC_EVENT_CHANNEL_SIZE: usize = 64;

/// Bounded wait when joining a worker thread
pub const STOP_TIMEOUT: Duration = Duration::from_secs(5);
