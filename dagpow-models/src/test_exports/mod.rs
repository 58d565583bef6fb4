// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Block builders for tests.
//!
//! Test blocks encode their single parent link in field 1 so that fake
//! chains can answer `NoParent` without the real validity rules.

use dagpow_time::DagTime;

use crate::block::{Block, BlockHash, RawBlock};
use crate::config::FIELD_SIZE;

const PARENT_FIELD_INDEX: usize = 1;
const SALT_FIELD_INDEX: usize = 2;

/// Block at `timestamp` referencing `parent`, made unique by `salt`.
pub fn make_block(timestamp: DagTime, parent: Option<BlockHash>, salt: u64) -> Block {
    let mut raw = RawBlock::zeroed();
    raw.set_timestamp(timestamp);
    if let Some(parent) = parent {
        raw.set_field(PARENT_FIELD_INDEX, &parent.0.to_bytes());
    }
    let mut salt_field = [0u8; FIELD_SIZE];
    salt_field[..8].copy_from_slice(&salt.to_le_bytes());
    raw.set_field(SALT_FIELD_INDEX, &salt_field);
    Block::parse(raw)
}

/// Parent written by [`make_block`], `None` for a root block.
pub fn parent_of(block: &Block) -> Option<BlockHash> {
    let field = block.raw().field(PARENT_FIELD_INDEX)?;
    if field.iter().all(|byte| *byte == 0) {
        None
    } else {
        Some(BlockHash(dagpow_hash::hash::Hash::from_bytes(field)))
    }
}

/// `count` blocks, each one the parent of the next, one main period apart.
pub fn make_chain(start: DagTime, count: usize, salt: u64) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::with_capacity(count);
    for index in 0..count {
        let parent = blocks.last().map(|block| block.id());
        let timestamp = start.saturating_add(
            crate::config::MAIN_PERIOD.saturating_mul(index as u64),
        );
        blocks.push(make_block(timestamp, parent, salt.wrapping_add(index as u64)));
    }
    blocks
}
