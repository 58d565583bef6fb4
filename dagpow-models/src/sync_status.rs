// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::sync::atomic::{AtomicBool, Ordering};

/// Whether local history caught up with the best known peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// still behind
    Syncing,
    /// caught up: blocks are relayed and mining may start
    Done,
}

/// Process-wide sync flag, moving once from `Syncing` to `Done`.
#[derive(Debug, Default)]
pub struct SyncStatus {
    done: AtomicBool,
}

impl SyncStatus {
    /// starts in `Syncing`
    pub fn new() -> Self {
        Self::default()
    }

    /// current state
    pub fn state(&self) -> SyncState {
        if self.done.load(Ordering::Acquire) {
            SyncState::Done
        } else {
            SyncState::Syncing
        }
    }

    /// shortcut for `state() == SyncState::Done`
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Move to `Done`. Returns true only for the call that made the transition.
    pub fn mark_done(&self) -> bool {
        self.done
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_transition_is_one_shot() {
        let status = Arc::new(SyncStatus::new());
        assert_eq!(status.state(), SyncState::Syncing);
        let winners: usize = (0..8)
            .map(|_| {
                let status = status.clone();
                std::thread::spawn(move || status.mark_done())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap() as usize)
            .sum();
        assert_eq!(winners, 1);
        assert!(status.is_done());
        assert!(!status.mark_done());
        assert_eq!(status.state(), SyncState::Done);
    }
}
