// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::convert::TryInto;

use dagpow_time::DagTime;

use crate::config::{RANGE_DIGEST_SIZE, RANGE_DIGEST_SLOTS, RANGE_DIGEST_SLOT_SIZE};
use crate::error::{ModelsError, ModelsResult};

/// Summary of the blocks of a time range, split in 16 sub-ranges.
///
/// Slot `i` covers `[start + i * step, start + (i + 1) * step)` with
/// `step = (end - start) >> 4`, the last slot extending to `end`. Each slot
/// holds the wrapping sum of the block sums (little-endian u64) followed by
/// the total size of those blocks (little-endian u64).
#[derive(Clone, PartialEq, Eq)]
pub struct RangeDigest([u8; RANGE_DIGEST_SIZE]);

impl Default for RangeDigest {
    fn default() -> Self {
        RangeDigest([0u8; RANGE_DIGEST_SIZE])
    }
}

impl RangeDigest {
    /// Copy `data`, which must be exactly 256 bytes long.
    pub fn from_bytes(data: &[u8]) -> ModelsResult<Self> {
        let bytes: [u8; RANGE_DIGEST_SIZE] = data
            .try_into()
            .map_err(|_| ModelsError::InvalidDigestSize(data.len()))?;
        Ok(RangeDigest(bytes))
    }

    /// raw bytes
    pub fn as_bytes(&self) -> &[u8; RANGE_DIGEST_SIZE] {
        &self.0
    }

    /// The 16 bytes summarizing sub-range `index`.
    pub fn slot(&self, index: usize) -> Option<&[u8]> {
        self.0
            .get(index * RANGE_DIGEST_SLOT_SIZE..(index + 1) * RANGE_DIGEST_SLOT_SIZE)
    }

    /// Sub-ranges whose summaries differ between `self` and `other`, in order.
    pub fn differing_slots(&self, other: &RangeDigest) -> Vec<usize> {
        self.0
            .chunks_exact(RANGE_DIGEST_SLOT_SIZE)
            .zip(other.0.chunks_exact(RANGE_DIGEST_SLOT_SIZE))
            .enumerate()
            .filter(|(_, (ours, theirs))| ours != theirs)
            .map(|(index, _)| index)
            .collect()
    }

    /// Account one block of sum `sum` and size `size` in sub-range `index`.
    pub fn add_block(&mut self, index: usize, sum: u64, size: u64) {
        if index >= RANGE_DIGEST_SLOTS {
            return;
        }
        let offset = index * RANGE_DIGEST_SLOT_SIZE;
        let (sum_bytes, size_bytes) = self.0[offset..offset + RANGE_DIGEST_SLOT_SIZE].split_at_mut(8);
        let read = |bytes: &[u8]| {
            let mut word = [0u8; 8];
            word.copy_from_slice(bytes);
            u64::from_le_bytes(word)
        };
        let new_sum = read(sum_bytes).wrapping_add(sum);
        let new_size = read(size_bytes).wrapping_add(size);
        sum_bytes.copy_from_slice(&new_sum.to_le_bytes());
        size_bytes.copy_from_slice(&new_size.to_le_bytes());
    }

    /// Digest of `[start, end)` from `(timestamp, sum, size)` triples.
    ///
    /// Entries outside the range are ignored. The span must be at least 16 ticks;
    /// when it is not a multiple of 16 the last slot absorbs the remainder.
    pub fn for_range<I>(start: DagTime, end: DagTime, blocks: I) -> ModelsResult<Self>
    where
        I: IntoIterator<Item = (DagTime, u64, u64)>,
    {
        let step = sub_range_step(start, end)?;
        let mut digest = RangeDigest::default();
        for (timestamp, sum, size) in blocks {
            if timestamp < start || timestamp >= end {
                continue;
            }
            let index = (timestamp.to_ticks() - start.to_ticks()) / step.to_ticks();
            let index = (index as usize).min(RANGE_DIGEST_SLOTS - 1);
            digest.add_block(index, sum, size);
        }
        Ok(digest)
    }
}

/// Length of one of the 16 sub-ranges of `[start, end)`.
pub fn sub_range_step(start: DagTime, end: DagTime) -> ModelsResult<DagTime> {
    let span = end
        .checked_sub(start)
        .map_err(|_| ModelsError::InvalidRange(start.to_ticks(), end.to_ticks()))?;
    let step = span.to_ticks() >> 4;
    if step == 0 {
        return Err(ModelsError::InvalidRange(start.to_ticks(), end.to_ticks()));
    }
    Ok(DagTime::from_ticks(step))
}

impl std::fmt::Debug for RangeDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sizes: Vec<u64> = self
            .0
            .chunks_exact(RANGE_DIGEST_SLOT_SIZE)
            .map(|slot| {
                let mut word = [0u8; 8];
                word.copy_from_slice(&slot[8..]);
                u64::from_le_bytes(word)
            })
            .collect();
        f.debug_struct("RangeDigest").field("sizes", &sizes).finish()
    }
}
