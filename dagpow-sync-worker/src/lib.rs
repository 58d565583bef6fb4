// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Sync worker: block admission with orphan buffering, and range
//! reconciliation with peers through recursive digest comparison.

#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

mod admission;
mod context;
mod controller;
mod pending;
mod range_sync;
mod requests;
mod serve;
mod worker;

pub use worker::start_sync_worker;

#[cfg(test)]
mod tests;
