// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Block producer: one candidate block per main period, sealed with the best
//! share returned by the miners.
//!
//! A single event loop thread owns the candidate. Shares, tip notices and
//! cycle timeouts reach it only through its event queue; a timer thread
//! raises the timeouts and a broadcaster thread pushes sealed blocks to the
//! peers.

#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]

mod broadcaster;
mod candidate;
mod controller;
mod event;
mod manager;
mod producer;
mod timer;
mod window;
mod worker;

pub use worker::start_mining_worker;

#[cfg(test)]
mod tests;
