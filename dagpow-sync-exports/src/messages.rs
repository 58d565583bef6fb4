// Copyright (c) 2022 MASSA LABS <info@massa.net>

use dagpow_models::{BlockHash, RangeDigest};
use dagpow_time::DagTime;

/// Sync messages exchanged with peers. Framing belongs to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncMessage {
    /// ask for the digest of `[start_time, end_time)`
    SumsRequest {
        /// range start
        start_time: DagTime,
        /// range end, excluded
        end_time: DagTime,
        /// correlates the reply
        nonce: u64,
    },
    /// digest of the requested range
    SumsReply {
        /// end of the requested range
        end_time: DagTime,
        /// nonce of the request
        nonce: u64,
        /// 16 sub-range summaries
        digest: RangeDigest,
    },
    /// ask for every block of `[start_time, end_time)`
    BlocksRequest {
        /// range start
        start_time: DagTime,
        /// range end, excluded
        end_time: DagTime,
        /// correlates the reply
        nonce: u64,
    },
    /// sent after the blocks of a `BlocksRequest`
    BlocksReply {
        /// whether the range was served
        ack: bool,
        /// end of the requested range
        end_time: DagTime,
        /// nonce of the request
        nonce: u64,
    },
    /// ask for one block
    BlockRequest {
        /// identity of the wanted block
        hash: BlockHash,
    },
    /// a block, mined, relayed or requested
    NewBlock {
        /// 512 raw bytes
        raw_block: Vec<u8>,
        /// remaining relay hops
        ttl: u8,
    },
}

impl SyncMessage {
    /// short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            SyncMessage::SumsRequest { .. } => "sums_request",
            SyncMessage::SumsReply { .. } => "sums_reply",
            SyncMessage::BlocksRequest { .. } => "blocks_request",
            SyncMessage::BlocksReply { .. } => "blocks_reply",
            SyncMessage::BlockRequest { .. } => "block_request",
            SyncMessage::NewBlock { .. } => "new_block",
        }
    }
}
