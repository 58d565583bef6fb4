// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::convert::TryInto;
use std::str::FromStr;

use dagpow_hash::{hash::Hash, task_digest::TaskDigest};
use dagpow_time::DagTime;
use serde::{Deserialize, Serialize};

use crate::config::{
    FIELD_SIZE, MIDSTATE_PREFIX_BYTES, NONCE_FIELD_INDEX, RAW_BLOCK_SIZE, TRAILING_FIELD_INDEX,
};
use crate::error::{ModelsError, ModelsResult};

/// Bytes of field 0 holding the little-endian timestamp
const TIMESTAMP_RANGE: std::ops::Range<usize> = 16..24;
/// Leading bytes of a block hash cleared in its identity
const HASH_LOW_CLEARED_BYTES: usize = 8;

/// Block identity: its hash with the first 8 bytes cleared.
///
/// Parent links, missing parent notices and block requests all use it.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Default, Serialize, Deserialize)]
pub struct BlockHash(pub Hash);

impl BlockHash {
    /// Identity of the block whose full hash is `hash`.
    pub fn from_full_hash(hash: &Hash) -> Self {
        let mut bytes = hash.to_bytes();
        bytes[..HASH_LOW_CLEARED_BYTES].fill(0);
        BlockHash(Hash::from_bytes(&bytes))
    }

    /// underlying hash
    pub fn get_hash(&self) -> &Hash {
        &self.0
    }
}

impl std::fmt::Display for BlockHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for BlockHash {
    type Err = ModelsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(BlockHash(Hash::from_str(s)?))
    }
}

/// 512 bytes of a block: 16 fields of 32 bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct RawBlock(Box<[u8; RAW_BLOCK_SIZE]>);

impl RawBlock {
    /// Copy `data`, which must be exactly one block long.
    pub fn from_bytes(data: &[u8]) -> ModelsResult<Self> {
        let bytes: [u8; RAW_BLOCK_SIZE] =
            data.try_into()
                .map_err(|_| ModelsError::InvalidBlockSize {
                    expected: RAW_BLOCK_SIZE,
                    got: data.len(),
                })?;
        Ok(RawBlock(Box::new(bytes)))
    }

    /// All zero block, to be filled field by field.
    pub fn zeroed() -> Self {
        RawBlock(Box::new([0u8; RAW_BLOCK_SIZE]))
    }

    /// raw bytes
    pub fn as_bytes(&self) -> &[u8; RAW_BLOCK_SIZE] {
        &self.0
    }

    /// Field `index`, `None` past the last field.
    pub fn field(&self, index: usize) -> Option<&[u8; FIELD_SIZE]> {
        self.0
            .get(index * FIELD_SIZE..(index + 1) * FIELD_SIZE)
            .and_then(|slice| slice.try_into().ok())
    }

    /// Overwrite field `index`. Returns false past the last field.
    pub fn set_field(&mut self, index: usize, value: &[u8; FIELD_SIZE]) -> bool {
        match self.0.get_mut(index * FIELD_SIZE..(index + 1) * FIELD_SIZE) {
            Some(slot) => {
                slot.copy_from_slice(value);
                true
            }
            None => false,
        }
    }

    /// Creation time, little-endian in bytes 16..24.
    pub fn timestamp(&self) -> DagTime {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.0[TIMESTAMP_RANGE]);
        DagTime::from_ticks(u64::from_le_bytes(bytes))
    }

    /// Write the creation time.
    pub fn set_timestamp(&mut self, timestamp: DagTime) {
        self.0[TIMESTAMP_RANGE].copy_from_slice(&timestamp.to_ticks().to_le_bytes());
    }

    /// Nonce in miner byte order.
    pub fn nonce(&self) -> [u8; FIELD_SIZE] {
        let mut nonce = [0u8; FIELD_SIZE];
        nonce.copy_from_slice(&self.0[NONCE_FIELD_INDEX * FIELD_SIZE..]);
        nonce.reverse();
        nonce
    }

    /// Store `nonce` (miner byte order) reversed in the last field.
    pub fn set_nonce(&mut self, nonce: &[u8; FIELD_SIZE]) {
        let slot = &mut self.0[NONCE_FIELD_INDEX * FIELD_SIZE..];
        slot.copy_from_slice(nonce);
        slot.reverse();
    }

    /// Byte-reversed double SHA-256 of the raw bytes.
    pub fn hash(&self) -> Hash {
        Hash::compute_double_from(&self.0[..]).reversed()
    }

    /// Wrapping sum of the 64 little-endian words, the block contribution to range digests.
    pub fn sum(&self) -> u64 {
        self.0
            .chunks_exact(8)
            .map(|word| {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(word);
                u64::from_le_bytes(bytes)
            })
            .fold(0u64, u64::wrapping_add)
    }

    /// Digest state covering everything but the nonce.
    ///
    /// The midstate stops after the first 448 bytes, the trailing field is
    /// absorbed on top of it so that only the nonce remains to be hashed.
    pub fn task_digest(&self) -> ModelsResult<TaskDigest> {
        let tail_end = (TRAILING_FIELD_INDEX + 1) * FIELD_SIZE;
        Ok(TaskDigest::new(
            &self.0[..MIDSTATE_PREFIX_BYTES],
            &self.0[MIDSTATE_PREFIX_BYTES..tail_end],
        )?)
    }
}

impl std::fmt::Debug for RawBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawBlock")
            .field("timestamp", &self.timestamp())
            .field("hash", &self.hash())
            .finish()
    }
}

/// Parsed block: raw bytes plus the derived identity and timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    raw: RawBlock,
    hash: Hash,
    id: BlockHash,
    timestamp: DagTime,
}

impl Block {
    /// Derive hash, identity and timestamp from `raw`.
    pub fn parse(raw: RawBlock) -> Self {
        let hash = raw.hash();
        Block {
            id: BlockHash::from_full_hash(&hash),
            timestamp: raw.timestamp(),
            hash,
            raw,
        }
    }

    /// Parse wire bytes.
    pub fn from_bytes(data: &[u8]) -> ModelsResult<Self> {
        Ok(Block::parse(RawBlock::from_bytes(data)?))
    }

    /// full hash
    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    /// identity (low hash)
    pub fn id(&self) -> BlockHash {
        self.id
    }

    /// creation time
    pub fn timestamp(&self) -> DagTime {
        self.timestamp
    }

    /// raw bytes
    pub fn raw(&self) -> &RawBlock {
        &self.raw
    }

    /// Consume into the raw bytes.
    pub fn into_raw(self) -> RawBlock {
        self.raw
    }
}
