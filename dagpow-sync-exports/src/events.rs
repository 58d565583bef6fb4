// Copyright (c) 2022 MASSA LABS <info@massa.net>

/// Notifications emitted by the sync worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    /// local history caught up, sent once
    SyncDone,
}
