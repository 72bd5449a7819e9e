//! Planning module for topology convergence.
//!
//! This module turns an aligned pair of topologies into operation sets:
//! host-level and shard-level diffs, correlation between the two, and the
//! bundled convergence plan the orchestrator applies.

mod correlate;
mod hosts;
mod plan;
mod shards;

pub use correlate::suppress_shard_covered;
pub use hosts::{HostChanges, HostDiffEngine};
pub use plan::ConvergencePlan;
pub use shards::{ShardChanges, ShardDiffEngine};
