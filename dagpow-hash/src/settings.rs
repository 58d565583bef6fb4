// Copyright (c) 2022 MASSA LABS <info@massa.net>

/// Hash size
pub const HASH_SIZE_BYTES: usize = 32;

/// Size of one SHA-256 compression block
pub const SHA256_BLOCK_BYTES: usize = 64;
