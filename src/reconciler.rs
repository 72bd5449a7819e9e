//! Reconciliation orchestrator.
//!
//! This module sequences the external API calls that converge a cluster to
//! its desired topology: shard creates first, then host creates, host
//! updates, shard deletes, and host deletes last. Each call is issued once
//! per non-empty operation set and awaited to completion; the first error
//! aborts the remaining sequence. There is no rollback — a partially
//! converged cluster is picked up by the next reconciliation pass.

use tracing::{error, info};

use crate::compare::HostComparator;
use crate::error::Result;
use crate::planner::ConvergencePlan;
use crate::projector::StateProjector;
use crate::service::{ClusterHostService, ShardedClusterHostService};
use crate::topology::Topology;

/// Orchestrator applying convergence plans through a cluster API surface.
pub struct HostReconciler<'a, C, S> {
    /// Comparator for the cluster kind.
    comparator: &'a C,
    /// Cluster API surface.
    service: &'a S,
}

/// Counts of the operations one reconciliation pass issued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ReconcileSummary {
    /// Number of shards created.
    pub shards_created: usize,
    /// Number of hosts created individually.
    pub hosts_created: usize,
    /// Number of hosts updated.
    pub hosts_updated: usize,
    /// Number of shards deleted.
    pub shards_deleted: usize,
    /// Number of hosts deleted individually.
    pub hosts_deleted: usize,
}

impl<'a, C, S> HostReconciler<'a, C, S>
where
    C: HostComparator,
    S: ClusterHostService<C>,
{
    /// Creates a new reconciler over the given comparator and service.
    #[must_use]
    pub const fn new(comparator: &'a C, service: &'a S) -> Self {
        Self {
            comparator,
            service,
        }
    }

    /// Converges an unsharded cluster to the desired topology.
    ///
    /// Sequence: create hosts, update hosts, delete hosts.
    ///
    /// # Errors
    ///
    /// Returns the planning error or the first API error; remaining steps
    /// are not attempted.
    pub async fn update_cluster_hosts(
        &self,
        cluster_id: &str,
        desired: &Topology,
        observed: &Topology,
    ) -> Result<ReconcileSummary> {
        let plan = ConvergencePlan::for_hosts(desired, observed, self.comparator)?;

        if plan.is_empty() {
            info!("Cluster {cluster_id} hosts are converged");
            return Ok(ReconcileSummary::default());
        }

        info!(
            "Converging cluster {cluster_id}: {} host operations",
            plan.operation_count()
        );

        let mut summary = ReconcileSummary::default();
        self.apply_host_creates(cluster_id, &plan, &mut summary).await?;
        self.apply_host_updates(cluster_id, &plan, &mut summary).await?;
        self.apply_host_deletes(cluster_id, &plan, &mut summary).await?;

        Ok(summary)
    }

    /// Reads the remote hosts and projects them onto the prior topology.
    ///
    /// This is the Read-side counterpart of the update entry points: it
    /// lists hosts through the service and correlates them back to the
    /// label-keyed topology Terraform state expects.
    ///
    /// # Errors
    ///
    /// Returns the listing error, or an internal error if a host awaiting
    /// creation cannot be correlated to any API host.
    pub async fn read_hosts(&self, cluster_id: &str, prior: &Topology) -> Result<Topology> {
        let api_hosts = self.service.list_hosts(cluster_id).await?;
        StateProjector::new().project(&api_hosts, prior, self.comparator)
    }

    async fn apply_host_creates(
        &self,
        cluster_id: &str,
        plan: &ConvergencePlan<C::UpdateSpec>,
        summary: &mut ReconcileSummary,
    ) -> Result<()> {
        if plan.host_creates.is_empty() {
            return Ok(());
        }

        info!("Creating {} host(s)", plan.host_creates.len());
        let specs = plan
            .host_creates
            .iter()
            .map(|host| self.comparator.to_create_spec(host))
            .collect();

        self.service
            .create_hosts(cluster_id, specs)
            .await
            .inspect_err(|err| error!("Host creation failed: {err}"))?;

        summary.hosts_created = plan.host_creates.len();
        Ok(())
    }

    async fn apply_host_updates(
        &self,
        cluster_id: &str,
        plan: &ConvergencePlan<C::UpdateSpec>,
        summary: &mut ReconcileSummary,
    ) -> Result<()> {
        if plan.host_updates.is_empty() {
            return Ok(());
        }

        info!("Updating {} host(s)", plan.host_updates.len());
        self.service
            .update_hosts(cluster_id, plan.host_updates.clone())
            .await
            .inspect_err(|err| error!("Host update failed: {err}"))?;

        summary.hosts_updated = plan.host_updates.len();
        Ok(())
    }

    async fn apply_host_deletes(
        &self,
        cluster_id: &str,
        plan: &ConvergencePlan<C::UpdateSpec>,
        summary: &mut ReconcileSummary,
    ) -> Result<()> {
        if plan.host_deletes.is_empty() {
            return Ok(());
        }

        info!("Deleting {} host(s)", plan.host_deletes.len());
        self.service
            .delete_hosts(cluster_id, plan.host_deletes.clone())
            .await
            .inspect_err(|err| error!("Host deletion failed: {err}"))?;

        summary.hosts_deleted = plan.host_deletes.len();
        Ok(())
    }
}

impl<C, S> HostReconciler<'_, C, S>
where
    C: HostComparator,
    S: ShardedClusterHostService<C>,
{
    /// Converges a sharded cluster to the desired topology.
    ///
    /// Sequence: create shards, create hosts, update hosts, delete shards,
    /// delete hosts. Shard creation precedes the hosts that land in new
    /// shards; shard deletion implicitly removes the hosts it owns, so
    /// those never reach the host delete step.
    ///
    /// # Errors
    ///
    /// Returns the planning error or the first API error; remaining steps
    /// are not attempted.
    pub async fn update_cluster_hosts_with_shards(
        &self,
        cluster_id: &str,
        desired: &Topology,
        observed: &Topology,
    ) -> Result<ReconcileSummary> {
        let plan = ConvergencePlan::for_sharded(desired, observed, self.comparator)?;

        if plan.is_empty() {
            info!("Cluster {cluster_id} shards and hosts are converged");
            return Ok(ReconcileSummary::default());
        }

        info!(
            "Converging cluster {cluster_id}: {} operations",
            plan.operation_count()
        );

        let mut summary = ReconcileSummary::default();

        for (shard, hosts) in &plan.shard_creates {
            info!("Creating shard '{shard}' with {} host(s)", hosts.len());
            let specs = hosts
                .iter()
                .map(|host| self.comparator.to_create_spec(host))
                .collect();
            self.service
                .create_shard(cluster_id, shard, specs)
                .await
                .inspect_err(|err| error!("Shard '{shard}' creation failed: {err}"))?;
            summary.shards_created += 1;
        }

        self.apply_host_creates(cluster_id, &plan, &mut summary).await?;
        self.apply_host_updates(cluster_id, &plan, &mut summary).await?;

        for shard in plan.shard_deletes.keys() {
            info!("Deleting shard '{shard}'");
            self.service
                .delete_shard(cluster_id, shard)
                .await
                .inspect_err(|err| error!("Shard '{shard}' deletion failed: {err}"))?;
            summary.shards_deleted += 1;
        }

        self.apply_host_deletes(cluster_id, &plan, &mut summary).await?;

        Ok(summary)
    }
}

impl ReconcileSummary {
    /// Returns true if no operation was issued.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.total() == 0
    }

    /// Returns the total number of operations issued.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.shards_created
            + self.hosts_created
            + self.hosts_updated
            + self.shards_deleted
            + self.hosts_deleted
    }
}

impl std::fmt::Display for ReconcileSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} shard(s) created, {} host(s) created, {} host(s) updated, {} shard(s) deleted, {} host(s) deleted",
            self.shards_created,
            self.hosts_created,
            self.hosts_updated,
            self.shards_deleted,
            self.hosts_deleted
        )
    }
}
