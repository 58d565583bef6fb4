// Copyright (c) 2022 MASSA LABS <info@massa.net>

use crate::block::BlockHash;

/// Classification of one admission attempt into the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// block already known
    Exist,
    /// imported, and it is the new best tip
    ImportedBest,
    /// imported on a side branch
    ImportedNotBest,
    /// a referenced block is unknown locally
    NoParent(BlockHash),
    /// rejected by the validity rules
    Invalid,
}

impl ImportOutcome {
    /// true for both imported variants
    pub fn is_imported(&self) -> bool {
        matches!(
            self,
            ImportOutcome::ImportedBest | ImportOutcome::ImportedNotBest
        )
    }
}
