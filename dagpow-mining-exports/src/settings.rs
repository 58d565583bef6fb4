// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::time::Duration;

use dagpow_models::config::{
    BLOCK_TTL, BROADCAST_QUEUE_SIZE, EVENT_QUEUE_SIZE, MAIN_PERIOD, MIN_CYCLE_LEAD,
    STOP_TIMEOUT, TIMER_POLL_INTERVAL,
};
use dagpow_time::DagTime;

/// Structure defining the settings of the block producer
#[derive(Debug, Clone)]
pub struct MiningConfig {
    /// length of a mining cycle
    pub main_period: DagTime,
    /// minimum time left to miners before the first deadline
    pub min_cycle_lead: DagTime,
    /// polling interval of the cycle timer
    pub timer_poll_interval: Duration,
    /// capacity of the outbound block queue
    pub broadcast_queue_size: usize,
    /// capacity of the event queue
    pub event_queue_size: usize,
    /// hop count of mined blocks
    pub block_ttl: u8,
    /// bounded wait when joining the producer threads
    pub stop_timeout: Duration,
}

impl Default for MiningConfig {
    fn default() -> Self {
        MiningConfig {
            main_period: MAIN_PERIOD,
            min_cycle_lead: MIN_CYCLE_LEAD,
            timer_poll_interval: TIMER_POLL_INTERVAL,
            broadcast_queue_size: BROADCAST_QUEUE_SIZE,
            event_queue_size: EVENT_QUEUE_SIZE,
            block_ttl: BLOCK_TTL,
            stop_timeout: STOP_TIMEOUT,
        }
    }
}
