//! Correlation between shard-level and host-level operations.
//!
//! A shard create provisions its initial host group and a shard delete
//! removes every host in it, so host operations covered by a shard
//! operation must be suppressed or the orchestrator would issue duplicate,
//! conflicting API calls.

use std::collections::BTreeSet;
use tracing::debug;

use super::hosts::HostChanges;
use super::shards::ShardChanges;

/// Removes host operations subsumed by a shard operation.
///
/// Hosts whose shard is slated for creation are dropped from the create
/// set; FQDNs owned by a shard slated for deletion are dropped from the
/// delete set. Pure filtering, no side effects.
#[must_use]
pub fn suppress_shard_covered<U>(
    mut changes: HostChanges<U>,
    shards: &ShardChanges,
) -> HostChanges<U> {
    let covered_fqdns: BTreeSet<&str> = shards
        .to_delete
        .values()
        .flatten()
        .filter_map(|host| host.fqdn.as_deref())
        .collect();

    let before_deletes = changes.to_delete.len();
    changes
        .to_delete
        .retain(|fqdn| !covered_fqdns.contains(fqdn.as_str()));

    let before_creates = changes.to_create.len();
    changes
        .to_create
        .retain(|host| !shards.to_create.contains_key(&host.shard));

    debug!(
        "Correlator suppressed {} creates and {} deletes covered by shard operations",
        before_creates - changes.to_create.len(),
        before_deletes - changes.to_delete.len()
    );

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::HostUpdate;
    use crate::topology::Host;
    use serde_json::json;

    fn create_test_host(fqdn: &str, shard: &str) -> Host {
        Host::new()
            .with_fqdn(fqdn)
            .with_shard(shard)
            .with_immutable("zone", json!("zone-a"))
    }

    #[test]
    fn test_suppresses_deletes_of_deleted_shard() {
        let mut shards = ShardChanges::new();
        shards.to_delete.insert(
            String::from("shard2"),
            vec![
                create_test_host("h2.example.com", "shard2"),
                create_test_host("h3.example.com", "shard2"),
            ],
        );

        let mut changes: HostChanges<HostUpdate> = HostChanges::new();
        changes.to_delete = vec![
            String::from("h1.example.com"),
            String::from("h2.example.com"),
            String::from("h3.example.com"),
        ];

        let filtered = suppress_shard_covered(changes, &shards);
        assert_eq!(filtered.to_delete, vec![String::from("h1.example.com")]);
    }

    #[test]
    fn test_suppresses_creates_of_created_shard() {
        let mut shards = ShardChanges::new();
        shards.to_create.insert(
            String::from("shard3"),
            vec![create_test_host("", "shard3")],
        );

        let mut changes: HostChanges<HostUpdate> = HostChanges::new();
        changes.to_create = vec![
            Host::new().with_shard("shard3"),
            Host::new().with_shard("shard1"),
        ];

        let filtered = suppress_shard_covered(changes, &shards);
        assert_eq!(filtered.to_create.len(), 1);
        assert_eq!(filtered.to_create[0].shard, "shard1");
    }

    #[test]
    fn test_no_shard_operations_is_identity() {
        let shards = ShardChanges::new();
        let mut changes: HostChanges<HostUpdate> = HostChanges::new();
        changes.to_create = vec![Host::new().with_shard("shard1")];
        changes.to_delete = vec![String::from("h1.example.com")];

        let filtered = suppress_shard_covered(changes, &shards);
        assert_eq!(filtered.to_create.len(), 1);
        assert_eq!(filtered.to_delete.len(), 1);
    }
}
