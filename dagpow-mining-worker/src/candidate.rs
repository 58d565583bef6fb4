// Copyright (c) 2022 MASSA LABS <info@massa.net>

use dagpow_hash::{hash::Hash, task_digest::TaskDigest};
use dagpow_models::{
    config::{FIELD_SIZE, MINER_ADDRESS_SIZE},
    Block, RawBlock, Task,
};
use dagpow_mining_exports::{BlockTemplateProvider, MiningConfig, MiningResult};
use dagpow_time::DagTime;
use rand::RngCore;

/// Hash the candidate would have with `nonce` (miner byte order) in its last
/// field, continued from the task digest.
pub(crate) fn share_hash(digest: &TaskDigest, nonce: &[u8; FIELD_SIZE]) -> Hash {
    let mut stored = *nonce;
    stored.reverse();
    digest.finalize_double(&stored).reversed()
}

/// Deadline of a cycle starting now: end of the main period containing
/// `now + min_cycle_lead`.
pub(crate) fn next_deadline(cfg: &MiningConfig) -> MiningResult<DagTime> {
    let now = DagTime::now()?;
    Ok(now
        .saturating_add(cfg.min_cycle_lead)
        .end_of_period(cfg.main_period)?)
}

/// Block being mined during one cycle, with the best nonce found so far.
pub(crate) struct CandidateBlock {
    raw: RawBlock,
    best_nonce: [u8; FIELD_SIZE],
    best_hash: Hash,
    task: Task,
    digest: TaskDigest,
}

impl CandidateBlock {
    /// Candidate built on `raw`, starting from the nonce `miner_address ++ 12 random bytes`.
    pub(crate) fn new(
        mut raw: RawBlock,
        miner_address: [u8; MINER_ADDRESS_SIZE],
        task_time: DagTime,
        task_index: u64,
    ) -> MiningResult<Self> {
        let mut nonce = [0u8; FIELD_SIZE];
        nonce[..MINER_ADDRESS_SIZE].copy_from_slice(&miner_address);
        rand::thread_rng().fill_bytes(&mut nonce[MINER_ADDRESS_SIZE..]);
        raw.set_nonce(&nonce);
        let (task, digest) = Task::for_block(&raw, task_time, task_index)?;
        let best_hash = raw.hash();
        Ok(CandidateBlock {
            raw,
            best_nonce: nonce,
            best_hash,
            task,
            digest,
        })
    }

    /// Fresh candidate for the cycle ending at the next deadline.
    pub(crate) fn for_next_cycle(
        cfg: &MiningConfig,
        template: &dyn BlockTemplateProvider,
        task_index: u64,
    ) -> MiningResult<(Self, DagTime)> {
        let deadline = next_deadline(cfg)?;
        let raw = template.create_block(deadline)?;
        let candidate = CandidateBlock::new(raw, template.miner_address(), deadline, task_index)?;
        Ok((candidate, deadline))
    }

    /// Score `nonce` and keep it when it strictly beats the current best.
    ///
    /// Returns the share hash and whether it was kept.
    pub(crate) fn offer(&mut self, nonce: &[u8; FIELD_SIZE]) -> (Hash, bool) {
        let hash = share_hash(&self.digest, nonce);
        if hash < self.best_hash {
            self.raw.set_nonce(nonce);
            self.best_nonce = *nonce;
            self.best_hash = hash;
            (hash, true)
        } else {
            (hash, false)
        }
    }

    pub(crate) fn task(&self) -> &Task {
        &self.task
    }

    pub(crate) fn best_hash(&self) -> Hash {
        self.best_hash
    }

    pub(crate) fn best_nonce(&self) -> [u8; FIELD_SIZE] {
        self.best_nonce
    }

    /// The block carrying the best nonce.
    pub(crate) fn seal(&self) -> Block {
        Block::parse(self.raw.clone())
    }
}
