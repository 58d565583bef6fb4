// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Node-level wiring of the block producer and the sync worker:
//! layered settings, logging initialisation and launch/stop of both workers.

#![warn(missing_docs)]

mod error;
mod launch;
/// tracing subscriber setup
pub mod logging;
/// layered node settings
pub mod settings;

pub use error::{NodeError, NodeResult};
pub use launch::{launch, NodeCollaborators, NodeHandles};
pub use settings::Settings;

#[cfg(test)]
mod tests;
