//! Shard-level diff computation.
//!
//! Shards exist implicitly as groups of hosts sharing a shard name. A shard
//! is created by creating its first host group and deleted by deleting all
//! its hosts as a unit, so the shard diff works on whole host groups.

use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{ConfigurationError, Result};
use crate::topology::{Host, Topology};

/// Shard-level operation sets for one reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct ShardChanges {
    /// Shards to create, with the hosts forming each one.
    pub to_create: BTreeMap<String, Vec<Host>>,
    /// Shards to delete, with the hosts they currently hold.
    pub to_delete: BTreeMap<String, Vec<Host>>,
}

impl ShardChanges {
    /// Creates an empty operation set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            to_create: BTreeMap::new(),
            to_delete: BTreeMap::new(),
        }
    }

    /// Returns true if no shard-level operation is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_delete.is_empty()
    }
}

/// Engine computing shard create/delete sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShardDiffEngine;

impl ShardDiffEngine {
    /// Creates a new shard diff engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes shard-level operations converging `observed` to `desired`.
    ///
    /// A shard name present on both sides needs no shard-level action; the
    /// host diff handles changes inside it. The empty shard name denotes an
    /// unsharded cluster: when at most two distinct names appear across both
    /// topologies and one of them is empty, the cluster is treated as
    /// unsharded and no shard operations are produced at all.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the empty shard name is mixed
    /// with more than one named shard.
    pub fn diff(&self, desired: &Topology, observed: &Topology) -> Result<ShardChanges> {
        let mut names = desired.shard_names();
        names.extend(observed.shard_names());

        if names.contains("") {
            if names.len() <= 2 {
                debug!("Cluster is unsharded, host diff covers all changes");
                return Ok(ShardChanges::new());
            }
            return Err(ConfigurationError::MixedShardNames {
                shard_count: names.len(),
            }
            .into());
        }

        let mut changes = ShardChanges {
            to_create: desired.hosts_by_shard(),
            to_delete: observed.hosts_by_shard(),
        };

        let stable: Vec<String> = changes
            .to_create
            .keys()
            .filter(|name| changes.to_delete.contains_key(*name))
            .cloned()
            .collect();

        for name in stable {
            changes.to_create.remove(&name);
            changes.to_delete.remove(&name);
        }

        debug!(
            "Shard diff: {} to create, {} to delete",
            changes.to_create.len(),
            changes.to_delete.len()
        );

        Ok(changes)
    }
}
