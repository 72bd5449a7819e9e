//! Convergence plan construction.
//!
//! A [`ConvergencePlan`] is the inspectable artifact between deciding and
//! acting: the filtered operation sets a reconciliation pass intends to
//! apply, in one bundle. The orchestrator consumes it immediately; resource
//! handlers can also build one without applying it to preview drift.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::debug;

use crate::compare::HostComparator;
use crate::error::Result;
use crate::matcher::Matcher;
use crate::topology::{Host, Topology};

use super::correlate::suppress_shard_covered;
use super::hosts::{HostChanges, HostDiffEngine};
use super::shards::{ShardChanges, ShardDiffEngine};

/// The complete set of operations one reconciliation pass will issue.
#[derive(Debug, Clone)]
pub struct ConvergencePlan<U> {
    /// When the plan was computed.
    pub created_at: DateTime<Utc>,
    /// Shards to create, with their initial host groups.
    pub shard_creates: BTreeMap<String, Vec<Host>>,
    /// Shards to delete.
    pub shard_deletes: BTreeMap<String, Vec<Host>>,
    /// Hosts to create individually.
    pub host_creates: Vec<Host>,
    /// Host update payloads.
    pub host_updates: Vec<U>,
    /// FQDNs of hosts to delete individually.
    pub host_deletes: Vec<String>,
}

impl<U> ConvergencePlan<U> {
    /// Computes the plan for an unsharded cluster.
    ///
    /// Aligns the observed topology to the desired labels, then runs the
    /// host diff. No shard operations are ever produced.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a matched label pair differs on
    /// immutable attributes.
    pub fn for_hosts<C>(desired: &Topology, observed: &Topology, cmp: &C) -> Result<Self>
    where
        C: HostComparator<UpdateSpec = U>,
    {
        let aligned = Matcher::new().align(desired, observed, cmp);
        let hosts = HostDiffEngine::new().diff(desired, &aligned, cmp)?;
        Ok(Self::from_changes(hosts, ShardChanges::new()))
    }

    /// Computes the plan for a sharded cluster.
    ///
    /// Aligns the observed topology, computes shard and host diffs, then
    /// suppresses host operations covered by shard operations.
    ///
    /// # Errors
    ///
    /// Returns a configuration error on an immutable-attribute mismatch or
    /// an invalid mixed empty-shard-name configuration.
    pub fn for_sharded<C>(desired: &Topology, observed: &Topology, cmp: &C) -> Result<Self>
    where
        C: HostComparator<UpdateSpec = U>,
    {
        let aligned = Matcher::new().align(desired, observed, cmp);
        let shards = ShardDiffEngine::new().diff(desired, &aligned)?;
        let hosts = HostDiffEngine::new().diff(desired, &aligned, cmp)?;
        let hosts = suppress_shard_covered(hosts, &shards);

        debug!(
            "Planned {} shard creates, {} shard deletes, {} host operations",
            shards.to_create.len(),
            shards.to_delete.len(),
            hosts.total()
        );

        Ok(Self::from_changes(hosts, shards))
    }

    fn from_changes(hosts: HostChanges<U>, shards: ShardChanges) -> Self {
        Self {
            created_at: Utc::now(),
            shard_creates: shards.to_create,
            shard_deletes: shards.to_delete,
            host_creates: hosts.to_create,
            host_updates: hosts.to_update,
            host_deletes: hosts.to_delete,
        }
    }

    /// Returns true if the cluster is already converged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shard_creates.is_empty()
            && self.shard_deletes.is_empty()
            && self.host_creates.is_empty()
            && self.host_updates.is_empty()
            && self.host_deletes.is_empty()
    }

    /// Returns the total number of API operations the plan will issue.
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.shard_creates.len()
            + self.shard_deletes.len()
            + self.host_creates.len()
            + self.host_updates.len()
            + self.host_deletes.len()
    }
}

impl<U> std::fmt::Display for ConvergencePlan<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "No changes required");
        }

        writeln!(f, "Convergence plan ({} operations):", self.operation_count())?;
        for shard in self.shard_creates.keys() {
            writeln!(f, "  create shard '{shard}'")?;
        }
        writeln!(f, "  create {} host(s)", self.host_creates.len())?;
        writeln!(f, "  update {} host(s)", self.host_updates.len())?;
        for shard in self.shard_deletes.keys() {
            writeln!(f, "  delete shard '{shard}'")?;
        }
        write!(f, "  delete {} host(s)", self.host_deletes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::AttributeComparator;
    use serde_json::json;

    fn create_test_host(fqdn: Option<&str>, shard: &str, param: i64) -> Host {
        let mut host = Host::new()
            .with_shard(shard)
            .with_immutable("zone", json!("zone-a"))
            .with_mutable("param_c", json!(param));
        if let Some(fqdn) = fqdn {
            host = host.with_fqdn(fqdn);
        }
        host
    }

    fn topology(entries: &[(&str, Host)]) -> Topology {
        entries
            .iter()
            .map(|(label, host)| ((*label).to_string(), host.clone()))
            .collect()
    }

    #[test]
    fn test_relabeled_identical_host_produces_no_operations() {
        // Plan {"host1": ...} vs state {"host2": ...} with identical hosts:
        // the matcher relabels and nothing is created, updated, or deleted.
        let cmp = AttributeComparator::new();
        let desired = topology(&[("host1", create_test_host(Some("h1.example.com"), "", 1))]);
        let observed = topology(&[("host2", create_test_host(Some("h1.example.com"), "", 1))]);

        let plan = ConvergencePlan::for_hosts(&desired, &observed, &cmp).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_added_host_produces_single_create() {
        let cmp = AttributeComparator::new();
        let desired = topology(&[
            ("host1", create_test_host(Some("h1.example.com"), "", 1)),
            ("host2", create_test_host(None, "", 2)),
        ]);
        let observed = topology(&[("host1", create_test_host(Some("h1.example.com"), "", 1))]);

        let plan = ConvergencePlan::for_hosts(&desired, &observed, &cmp).unwrap();
        assert_eq!(plan.host_creates.len(), 1);
        assert!(plan.host_updates.is_empty());
        assert!(plan.host_deletes.is_empty());
    }

    #[test]
    fn test_sharded_plan_suppresses_covered_host_operations() {
        let cmp = AttributeComparator::new();
        let desired = topology(&[
            ("a", create_test_host(Some("h1.example.com"), "shard1", 1)),
            ("b", create_test_host(None, "shard2", 1)),
        ]);
        let observed = topology(&[
            ("a", create_test_host(Some("h1.example.com"), "shard1", 1)),
            ("c", create_test_host(Some("h3.example.com"), "shard3", 1)),
        ]);

        let plan = ConvergencePlan::for_sharded(&desired, &observed, &cmp).unwrap();
        assert!(plan.shard_creates.contains_key("shard2"));
        assert!(plan.shard_deletes.contains_key("shard3"));
        // Host-level create of "b" and delete of h3 are covered by the
        // shard operations.
        assert!(plan.host_creates.is_empty());
        assert!(plan.host_deletes.is_empty());
    }

    #[test]
    fn test_unsharded_plan_for_sharded_entry_point() {
        // The sharded entry point on an unsharded cluster degrades to pure
        // host-level operations. The observed host shares no immutable
        // attributes with the desired one, so it is replaced outright.
        let cmp = AttributeComparator::new();
        let desired = topology(&[("h1", create_test_host(None, "", 1))]);
        let observed = topology(&[(
            "h2",
            Host::new()
                .with_fqdn("x.example.com")
                .with_immutable("zone", json!("zone-z"))
                .with_mutable("param_c", json!(9)),
        )]);

        let plan = ConvergencePlan::for_sharded(&desired, &observed, &cmp).unwrap();
        assert!(plan.shard_creates.is_empty());
        assert!(plan.shard_deletes.is_empty());
        assert_eq!(plan.host_creates.len(), 1);
        assert_eq!(plan.host_deletes, vec![String::from("x.example.com")]);
    }

    #[test]
    fn test_partial_match_degrades_to_update() {
        // Immutable attributes agree while mutable ones differ: the matcher
        // claims the host via partial match and the diff emits an update
        // instead of destroy-and-recreate.
        let cmp = AttributeComparator::new();
        let desired = topology(&[("h1", create_test_host(None, "", 1))]);
        let observed = topology(&[("h2", create_test_host(Some("x.example.com"), "", 9))]);

        let plan = ConvergencePlan::for_hosts(&desired, &observed, &cmp).unwrap();
        assert!(plan.host_creates.is_empty());
        assert!(plan.host_deletes.is_empty());
        assert_eq!(plan.host_updates.len(), 1);
        assert_eq!(plan.host_updates[0].fqdn, "x.example.com");
    }

    #[test]
    fn test_display_reports_operation_counts() {
        let cmp = AttributeComparator::new();
        let desired = topology(&[("host1", create_test_host(None, "", 1))]);
        let observed = Topology::new();

        let plan = ConvergencePlan::for_hosts(&desired, &observed, &cmp).unwrap();
        let rendered = plan.to_string();
        assert!(rendered.contains("create 1 host(s)"));
    }
}
