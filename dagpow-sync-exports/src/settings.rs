// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::time::Duration;

use dagpow_models::config::{
    BLOCK_TTL, FULL_SYNC_SPAN, MAX_PENDING_PARENTS, PENDING_EVICTION_BATCH,
    PENDING_REREQUEST_DELAY, REQUEST_BLOCKS_MAX_TIME, REQUEST_WAIT, STOP_TIMEOUT,
    SYNC_DONE_WAIT, SYNC_EVENT_CHANNEL_SIZE, SYNC_INTERVAL, SYNC_START_DELAY,
};
use dagpow_time::DagTime;

/// Sync worker configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// interval between two range sync cycles
    pub sync_interval: Duration,
    /// delay before the first range sync cycle
    pub sync_start_delay: Duration,
    /// time after which a node that never caught up declares itself synced
    pub sync_done_wait: Duration,
    /// largest span requested directly as blocks
    pub max_blocks_request_span: DagTime,
    /// timeout of an outstanding sums or blocks request
    pub request_timeout: Duration,
    /// span of the root digest request, starting at 0
    pub full_sync_span: DagTime,
    /// maximum number of missing parents tracked
    pub max_pending_parents: usize,
    /// parents evicted at once when the pending map is full
    pub pending_eviction_batch: usize,
    /// a duplicate orphan re-triggers its parent request after this delay
    pub pending_rerequest_delay: Duration,
    /// hop count of requested blocks
    pub block_ttl: u8,
    /// capacity of the sync event channel
    pub event_channel_size: usize,
    /// bounded wait when joining the worker thread
    pub stop_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            sync_interval: SYNC_INTERVAL,
            sync_start_delay: SYNC_START_DELAY,
            sync_done_wait: SYNC_DONE_WAIT,
            max_blocks_request_span: REQUEST_BLOCKS_MAX_TIME,
            request_timeout: REQUEST_WAIT,
            full_sync_span: FULL_SYNC_SPAN,
            max_pending_parents: MAX_PENDING_PARENTS,
            pending_eviction_batch: PENDING_EVICTION_BATCH,
            pending_rerequest_delay: PENDING_REREQUEST_DELAY,
            block_ttl: BLOCK_TTL,
            event_channel_size: SYNC_EVENT_CHANNEL_SIZE,
            stop_timeout: STOP_TIMEOUT,
        }
    }
}
