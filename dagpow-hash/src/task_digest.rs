// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Resumable SHA-256 state.
//!
//! Miners receive the raw compression state reached after the aligned prefix
//! of a block (the *midstate*) and only hash the remaining bytes themselves.
//! The node keeps a [`TaskDigest`] to recompute the same double SHA-256 for
//! every nonce they submit without rehashing the prefix.

use sha2::{
    compress256,
    digest::generic_array::{typenum::U64, GenericArray},
    Digest, Sha256,
};

use crate::{error::HashError, hash::Hash, settings::SHA256_BLOCK_BYTES, HASH_SIZE_BYTES};

/// SHA-256 initial hash values (FIPS 180-4, 5.3.3)
const SHA256_IV: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

/// SHA-256 state over `prefix ++ tail`, ready to absorb the final bytes.
#[derive(Clone)]
pub struct TaskDigest {
    /// compression state after `prefix`, words serialized little-endian
    midstate: [u8; HASH_SIZE_BYTES],
    /// running hasher that already absorbed `prefix ++ tail`
    hasher: Sha256,
}

impl TaskDigest {
    /// Absorb `prefix` (a whole number of 64-byte blocks) then `tail`.
    ///
    /// # Example
    ///  ```
    /// # use dagpow_hash::{hash::Hash, task_digest::TaskDigest};
    /// let prefix = [7u8; 128];
    /// let digest = TaskDigest::new(&prefix, b"tail").unwrap();
    /// let mut full = prefix.to_vec();
    /// full.extend_from_slice(b"tail");
    /// full.extend_from_slice(b"nonce");
    /// assert_eq!(digest.finalize_double(b"nonce"), Hash::compute_double_from(&full));
    /// ```
    pub fn new(prefix: &[u8], tail: &[u8]) -> Result<Self, HashError> {
        if prefix.len() % SHA256_BLOCK_BYTES != 0 {
            return Err(HashError::UnalignedPrefix(prefix.len()));
        }
        let mut state = SHA256_IV;
        let blocks: Vec<GenericArray<u8, U64>> = prefix
            .chunks_exact(SHA256_BLOCK_BYTES)
            .map(|chunk| GenericArray::clone_from_slice(chunk))
            .collect();
        compress256(&mut state, &blocks);
        let mut midstate = [0u8; HASH_SIZE_BYTES];
        for (i, word) in state.iter().enumerate() {
            midstate[i * 4..i * 4 + 4].copy_from_slice(&word.to_le_bytes());
        }

        let mut hasher = Sha256::new();
        hasher.update(prefix);
        hasher.update(tail);
        Ok(TaskDigest { midstate, hasher })
    }

    /// Compression state after the prefix, as sent to miners.
    pub fn midstate(&self) -> [u8; HASH_SIZE_BYTES] {
        self.midstate
    }

    /// SHA-256(SHA-256(prefix ++ tail ++ last)). The stored state is left untouched.
    pub fn finalize_double(&self, last: &[u8]) -> Hash {
        let mut hasher = self.hasher.clone();
        hasher.update(last);
        let first = hasher.finalize();
        Hash::from_bytes(&Sha256::digest(first).into())
    }
}

impl std::fmt::Debug for TaskDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskDigest")
            .field("midstate", &Hash::from_bytes(&self.midstate))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unaligned_prefix_rejected() {
        assert!(matches!(
            TaskDigest::new(&[0u8; 63], &[]),
            Err(HashError::UnalignedPrefix(63))
        ));
    }

    #[test]
    fn test_empty_prefix_midstate_is_iv() {
        let digest = TaskDigest::new(&[], &[]).unwrap();
        let midstate = digest.midstate();
        assert_eq!(&midstate[0..4], &0x6a09e667u32.to_le_bytes());
        assert_eq!(&midstate[28..32], &0x5be0cd19u32.to_le_bytes());
    }

    #[test]
    fn test_midstate_depends_on_prefix_only() {
        let prefix = [3u8; 448];
        let a = TaskDigest::new(&prefix, &[1u8; 32]).unwrap();
        let b = TaskDigest::new(&prefix, &[2u8; 32]).unwrap();
        assert_eq!(a.midstate(), b.midstate());
        assert_ne!(a.finalize_double(&[0u8; 32]), b.finalize_double(&[0u8; 32]));
    }

    #[test]
    fn test_finalize_is_repeatable() {
        let digest = TaskDigest::new(&[9u8; 448], &[4u8; 32]).unwrap();
        let nonce = [5u8; 32];
        assert_eq!(digest.finalize_double(&nonce), digest.finalize_double(&nonce));
    }
}
