// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Node settings are merged from three layers, later ones overriding:
//! 1. the shipped `base_config/config.toml`
//! 2. an optional override file (`config/config.toml` by default)
//! 3. environment variables `DAGPOW__<SECTION>__<KEY>`

use std::{path::Path, time::Duration};

use dagpow_mining_exports::MiningConfig;
use dagpow_sync_exports::SyncConfig;
use dagpow_time::DagTime;
use serde::Deserialize;

use crate::NodeResult;

/// Default location of the shipped settings
pub const BASE_CONFIG_PATH: &str = "base_config/config.toml";
/// Default location of the operator overrides
pub const OVERRIDE_CONFIG_PATH: &str = "config/config.toml";
/// Prefix of the overriding environment variables
pub const ENV_PREFIX: &str = "DAGPOW";

/// Logging settings
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct LoggingSettings {
    /// verbosity, 0 (errors) to 4 (trace)
    pub level: usize,
}

/// Block producer settings, see [`MiningConfig`]
#[allow(missing_docs)]
#[derive(Debug, Deserialize, Clone)]
pub struct MiningSettings {
    pub main_period: DagTime,
    pub min_cycle_lead: DagTime,
    pub timer_poll_interval_ms: u64,
    pub broadcast_queue_size: usize,
    pub event_queue_size: usize,
    pub block_ttl: u8,
    pub stop_timeout_ms: u64,
}

/// Sync worker settings, see [`SyncConfig`]
#[allow(missing_docs)]
#[derive(Debug, Deserialize, Clone)]
pub struct SyncSettings {
    pub sync_interval_ms: u64,
    pub sync_start_delay_ms: u64,
    pub sync_done_wait_ms: u64,
    pub max_blocks_request_span: DagTime,
    pub request_timeout_ms: u64,
    pub full_sync_span: DagTime,
    pub max_pending_parents: usize,
    pub pending_eviction_batch: usize,
    pub pending_rerequest_delay_ms: u64,
    pub block_ttl: u8,
    pub event_channel_size: usize,
    pub stop_timeout_ms: u64,
}

/// Node settings
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// logging
    pub logging: LoggingSettings,
    /// block producer
    pub mining: MiningSettings,
    /// sync worker
    pub sync: SyncSettings,
}

impl Settings {
    /// Merge `base`, then `override_path` when it exists, then the environment.
    pub fn load(base: &Path, override_path: Option<&Path>) -> NodeResult<Settings> {
        let mut builder = config::Config::builder().add_source(config::File::from(base));
        if let Some(path) = override_path.filter(|path| path.is_file()) {
            builder = builder.add_source(config::File::from(path));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Load from the default paths, relative to the working directory.
    pub fn load_default() -> NodeResult<Settings> {
        Settings::load(
            Path::new(BASE_CONFIG_PATH),
            Some(Path::new(OVERRIDE_CONFIG_PATH)),
        )
    }
}

impl From<&MiningSettings> for MiningConfig {
    fn from(settings: &MiningSettings) -> Self {
        MiningConfig {
            main_period: settings.main_period,
            min_cycle_lead: settings.min_cycle_lead,
            timer_poll_interval: Duration::from_millis(settings.timer_poll_interval_ms),
            broadcast_queue_size: settings.broadcast_queue_size,
            event_queue_size: settings.event_queue_size,
            block_ttl: settings.block_ttl,
            stop_timeout: Duration::from_millis(settings.stop_timeout_ms),
        }
    }
}

impl From<&SyncSettings> for SyncConfig {
    fn from(settings: &SyncSettings) -> Self {
        SyncConfig {
            sync_interval: Duration::from_millis(settings.sync_interval_ms),
            sync_start_delay: Duration::from_millis(settings.sync_start_delay_ms),
            sync_done_wait: Duration::from_millis(settings.sync_done_wait_ms),
            max_blocks_request_span: settings.max_blocks_request_span,
            request_timeout: Duration::from_millis(settings.request_timeout_ms),
            full_sync_span: settings.full_sync_span,
            max_pending_parents: settings.max_pending_parents,
            pending_eviction_batch: settings.pending_eviction_batch,
            pending_rerequest_delay: Duration::from_millis(settings.pending_rerequest_delay_ms),
            block_ttl: settings.block_ttl,
            event_channel_size: settings.event_channel_size,
            stop_timeout: Duration::from_millis(settings.stop_timeout_ms),
        }
    }
}
