// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::{
    collections::{HashMap, VecDeque},
    time::{Duration, Instant},
};

use dagpow_models::{BlockHash, BlockWrapper};
use rand::seq::IteratorRandom;
use tracing::debug;

struct PendingEntry {
    wrapper: BlockWrapper,
    queued_at: Instant,
}

/// What `push` did with an orphan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PushOutcome {
    /// first orphan waiting for this parent
    First,
    /// added behind other orphans of the same parent
    Queued,
    /// already queued for this parent, recently
    Duplicate,
    /// already queued for this parent long enough ago to ask again
    Refreshed,
}

impl PushOutcome {
    /// Whether the missing parent should be requested.
    pub(crate) fn should_request(&self) -> bool {
        matches!(self, PushOutcome::First | PushOutcome::Refreshed)
    }
}

/// Orphans grouped by the parent they miss, in arrival order.
///
/// A child appears in at most one queue. When `max_parents` parents are
/// tracked, `eviction_batch` random ones are forgotten before a new parent
/// is added.
pub(crate) struct PendingByParent {
    by_parent: HashMap<BlockHash, VecDeque<PendingEntry>>,
    parent_of_child: HashMap<BlockHash, BlockHash>,
    max_parents: usize,
    eviction_batch: usize,
    rerequest_delay: Duration,
}

impl PendingByParent {
    pub(crate) fn new(max_parents: usize, eviction_batch: usize, rerequest_delay: Duration) -> Self {
        PendingByParent {
            by_parent: HashMap::new(),
            parent_of_child: HashMap::new(),
            max_parents,
            eviction_batch,
            rerequest_delay,
        }
    }

    /// Queue `wrapper` until `parent` is imported.
    pub(crate) fn push(
        &mut self,
        parent: BlockHash,
        wrapper: BlockWrapper,
        now: Instant,
    ) -> PushOutcome {
        let child = wrapper.block.id();
        match self.parent_of_child.get(&child).copied() {
            Some(previous) if previous == parent => {
                return self.touch(parent, child, now);
            }
            Some(previous) => self.remove_child(previous, child),
            None => {}
        }

        if !self.by_parent.contains_key(&parent) && self.by_parent.len() >= self.max_parents {
            self.evict();
        }
        let queue = self.by_parent.entry(parent).or_default();
        let outcome = if queue.is_empty() {
            PushOutcome::First
        } else {
            PushOutcome::Queued
        };
        queue.push_back(PendingEntry {
            wrapper,
            queued_at: now,
        });
        self.parent_of_child.insert(child, parent);
        outcome
    }

    /// Remove and return every orphan waiting for `parent`, oldest first.
    pub(crate) fn take(&mut self, parent: &BlockHash) -> Vec<BlockWrapper> {
        let Some(queue) = self.by_parent.remove(parent) else {
            return Vec::new();
        };
        queue
            .into_iter()
            .map(|entry| {
                self.parent_of_child.remove(&entry.wrapper.block.id());
                entry.wrapper
            })
            .collect()
    }

    /// number of queued orphans
    pub(crate) fn len(&self) -> usize {
        self.parent_of_child.len()
    }

    /// number of missing parents
    pub(crate) fn parent_count(&self) -> usize {
        self.by_parent.len()
    }

    fn touch(&mut self, parent: BlockHash, child: BlockHash, now: Instant) -> PushOutcome {
        let delay = self.rerequest_delay;
        let entry = self
            .by_parent
            .get_mut(&parent)
            .and_then(|queue| queue.iter_mut().find(|entry| entry.wrapper.block.id() == child));
        match entry {
            Some(entry) if now.saturating_duration_since(entry.queued_at) >= delay => {
                entry.queued_at = now;
                PushOutcome::Refreshed
            }
            _ => PushOutcome::Duplicate,
        }
    }

    fn remove_child(&mut self, parent: BlockHash, child: BlockHash) {
        if let Some(queue) = self.by_parent.get_mut(&parent) {
            queue.retain(|entry| entry.wrapper.block.id() != child);
            if queue.is_empty() {
                self.by_parent.remove(&parent);
            }
        }
        self.parent_of_child.remove(&child);
    }

    fn evict(&mut self) {
        let victims: Vec<BlockHash> = self
            .by_parent
            .keys()
            .copied()
            .choose_multiple(&mut rand::thread_rng(), self.eviction_batch.max(1));
        debug!("pending map full, evicting {} missing parents", victims.len());
        for parent in victims {
            if let Some(queue) = self.by_parent.remove(&parent) {
                for entry in queue {
                    self.parent_of_child.remove(&entry.wrapper.block.id());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagpow_models::test_exports::make_block;
    use dagpow_time::DagTime;

    fn orphan(salt: u64, parent: BlockHash) -> BlockWrapper {
        BlockWrapper::local(make_block(DagTime::from_ticks(salt), Some(parent), salt), 5)
    }

    fn parent(salt: u64) -> BlockHash {
        make_block(DagTime::ZERO, None, salt).id()
    }

    #[test]
    fn test_duplicate_push_is_noop() {
        let mut pending = PendingByParent::new(10, 1, Duration::from_secs(64));
        let now = Instant::now();
        let missing = parent(1);
        assert_eq!(pending.push(missing, orphan(10, missing), now), PushOutcome::First);
        assert_eq!(pending.push(missing, orphan(10, missing), now), PushOutcome::Duplicate);
        assert_eq!(pending.push(missing, orphan(11, missing), now), PushOutcome::Queued);
        assert_eq!(pending.len(), 2);
        assert_eq!(pending.parent_count(), 1);
    }

    #[test]
    fn test_stale_duplicate_is_refreshed() {
        let mut pending = PendingByParent::new(10, 1, Duration::from_secs(64));
        let then = Instant::now();
        let missing = parent(1);
        pending.push(missing, orphan(10, missing), then);
        let later = then + Duration::from_secs(65);
        assert_eq!(pending.push(missing, orphan(10, missing), later), PushOutcome::Refreshed);
        assert_eq!(pending.push(missing, orphan(10, missing), later), PushOutcome::Duplicate);
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn test_take_returns_fifo_and_clears() {
        let mut pending = PendingByParent::new(10, 1, Duration::from_secs(64));
        let now = Instant::now();
        let missing = parent(1);
        let first = orphan(10, missing);
        let second = orphan(11, missing);
        pending.push(missing, first.clone(), now);
        pending.push(missing, second.clone(), now);
        let taken: Vec<BlockHash> = pending.take(&missing).iter().map(|w| w.block.id()).collect();
        assert_eq!(taken, vec![first.block.id(), second.block.id()]);
        assert_eq!(pending.len(), 0);
        assert!(pending.take(&missing).is_empty());
    }

    #[test]
    fn test_child_moves_to_new_parent() {
        let mut pending = PendingByParent::new(10, 1, Duration::from_secs(64));
        let now = Instant::now();
        let (a, b) = (parent(1), parent(2));
        pending.push(a, orphan(10, a), now);
        assert_eq!(pending.push(b, orphan(10, a), now), PushOutcome::First);
        assert_eq!(pending.len(), 1);
        assert!(pending.take(&a).is_empty());
        assert_eq!(pending.take(&b).len(), 1);
    }

    #[test]
    fn test_eviction_when_full() {
        let mut pending = PendingByParent::new(4, 2, Duration::from_secs(64));
        let now = Instant::now();
        for salt in 0..4 {
            let missing = parent(salt);
            pending.push(missing, orphan(100 + salt, missing), now);
        }
        assert_eq!(pending.parent_count(), 4);
        let missing = parent(99);
        assert_eq!(pending.push(missing, orphan(200, missing), now), PushOutcome::First);
        assert_eq!(pending.parent_count(), 3);
        assert_eq!(pending.len(), 3);
        assert_eq!(pending.take(&missing).len(), 1);
    }
}
