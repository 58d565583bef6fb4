// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::block::Block;
use crate::peer::PeerId;

/// A block on its way into the chain.
#[derive(Debug, Clone)]
pub struct BlockWrapper {
    /// the block
    pub block: Block,
    /// remaining relay hops
    pub ttl: u8,
    /// sender, `None` for blocks mined locally
    pub origin_peer: Option<PeerId>,
}

impl BlockWrapper {
    /// Block received from `peer`.
    pub fn from_peer(block: Block, ttl: u8, peer: PeerId) -> Self {
        BlockWrapper {
            block,
            ttl,
            origin_peer: Some(peer),
        }
    }

    /// Block mined by this node.
    pub fn local(block: Block, ttl: u8) -> Self {
        BlockWrapper {
            block,
            ttl,
            origin_peer: None,
        }
    }

    /// Hop count to put on a relayed copy, `None` when relay is exhausted.
    pub fn relay_ttl(&self) -> Option<u8> {
        self.ttl.checked_sub(1).filter(|ttl| *ttl > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::RawBlock;

    #[test]
    fn test_relay_ttl_strictly_decreases() {
        let block = Block::parse(RawBlock::zeroed());
        for ttl in 0..=u8::MAX {
            let wrapper = BlockWrapper::local(block.clone(), ttl);
            match wrapper.relay_ttl() {
                Some(next) => assert!(next < ttl && next > 0),
                None => assert!(ttl <= 1),
            }
        }
    }
}
