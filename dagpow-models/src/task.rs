// Copyright (c) 2022 MASSA LABS <info@massa.net>

use dagpow_hash::{task_digest::TaskDigest, HASH_SIZE_BYTES};
use dagpow_time::DagTime;
use serde::{Deserialize, Serialize};

use crate::block::RawBlock;
use crate::config::{FIELD_SIZE, TRAILING_FIELD_INDEX};
use crate::error::ModelsResult;

/// Work handed to miners.
///
/// `work[0]` is the SHA-256 midstate after the first 448 bytes of the
/// candidate block, `work[1]` its trailing field. Miners hash
/// `work[1] ++ nonce` on top of the midstate and send the nonce back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// midstate then trailing field
    pub work: [[u8; HASH_SIZE_BYTES]; 2],
    /// send time of the cycle this task belongs to
    pub task_time: DagTime,
    /// strictly increasing across tasks
    pub task_index: u64,
}

impl Task {
    /// Task for mining `block`, along with the digest state that scores its shares.
    pub fn for_block(
        block: &RawBlock,
        task_time: DagTime,
        task_index: u64,
    ) -> ModelsResult<(Task, TaskDigest)> {
        let digest = block.task_digest()?;
        let mut trailing = [0u8; FIELD_SIZE];
        if let Some(field) = block.field(TRAILING_FIELD_INDEX) {
            trailing = *field;
        }
        let task = Task {
            work: [digest.midstate(), trailing],
            task_time,
            task_index,
        };
        Ok((task, digest))
    }

    /// SHA-256 state after the first 448 bytes
    pub fn midstate(&self) -> &[u8; HASH_SIZE_BYTES] {
        &self.work[0]
    }

    /// last field hashed before the nonce
    pub fn trailing_field(&self) -> &[u8; HASH_SIZE_BYTES] {
        &self.work[1]
    }
}

/// Identifier of a miner connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "channel#{}", self.0)
    }
}

/// Nonce submitted by a miner for the task `task_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    /// nonce in miner byte order
    pub nonce: [u8; HASH_SIZE_BYTES],
    /// task the nonce was mined for
    pub task_index: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_carries_trailing_field() {
        let mut raw = RawBlock::zeroed();
        raw.set_field(TRAILING_FIELD_INDEX, &[0x5au8; FIELD_SIZE]);
        let (task, digest) = Task::for_block(&raw, DagTime::from_ticks(0x1_0000), 3).unwrap();
        assert_eq!(task.trailing_field(), &[0x5au8; FIELD_SIZE]);
        assert_eq!(task.midstate(), &digest.midstate());
        assert_eq!(task.task_index, 3);
    }

    #[test]
    fn test_midstate_ignores_trailing_field() {
        let mut a = RawBlock::zeroed();
        let mut b = RawBlock::zeroed();
        a.set_field(TRAILING_FIELD_INDEX, &[1u8; FIELD_SIZE]);
        b.set_field(TRAILING_FIELD_INDEX, &[2u8; FIELD_SIZE]);
        let (task_a, _) = Task::for_block(&a, DagTime::ZERO, 0).unwrap();
        let (task_b, _) = Task::for_block(&b, DagTime::ZERO, 0).unwrap();
        assert_eq!(task_a.midstate(), task_b.midstate());
    }
}
