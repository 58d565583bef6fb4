// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Hashing primitives of the node: the 32-byte [`Hash`](hash::Hash) and the
//! resumable SHA-256 state handed to miners ([`TaskDigest`](task_digest::TaskDigest)).

#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

pub use error::HashError;
pub use settings::{HASH_SIZE_BYTES, SHA256_BLOCK_BYTES};

mod error;
pub mod hash;
mod settings;
pub mod task_digest;
