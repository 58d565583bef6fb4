// Copyright (c) 2022 MASSA LABS <info@massa.net>

use dagpow_hash::hash::Hash;
use dagpow_models::config::{BEST_SHARE_WINDOW_SLOTS, FIELD_SIZE};
use dagpow_time::DagTime;

/// Best share of each of the last 16 main periods, indexed by period modulo 16.
#[derive(Debug, Clone, Default)]
pub(crate) struct BestShareWindow {
    slots: [Option<([u8; FIELD_SIZE], Hash)>; BEST_SHARE_WINDOW_SLOTS],
}

impl BestShareWindow {
    /// Slot of the period containing `task_time`.
    pub(crate) fn slot_for(task_time: DagTime, main_period: DagTime) -> usize {
        let index = task_time.period_index(main_period).unwrap_or_default();
        (index % BEST_SHARE_WINDOW_SLOTS as u64) as usize
    }

    /// Forget what the slot held 16 periods ago.
    pub(crate) fn open(&mut self, slot: usize) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = None;
        }
    }

    /// Keep `nonce` in `slot` if its hash beats the slot's best.
    pub(crate) fn update(&mut self, slot: usize, nonce: [u8; FIELD_SIZE], hash: Hash) {
        if let Some(entry) = self.slots.get_mut(slot) {
            if entry.map_or(true, |(_, best)| hash < best) {
                *entry = Some((nonce, hash));
            }
        }
    }

    /// best hash of every slot
    pub(crate) fn hashes(&self) -> Vec<Option<Hash>> {
        self.slots
            .iter()
            .map(|entry| entry.map(|(_, hash)| hash))
            .collect()
    }
}
