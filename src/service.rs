//! Abstract cluster API surface.
//!
//! The engine never talks to a cloud API directly; resource handlers supply
//! an implementation of these traits backed by their concrete client. The
//! payload types are tied to the cluster kind's [`HostComparator`] so one
//! comparator fixes the whole wire vocabulary.

use async_trait::async_trait;

use crate::compare::HostComparator;
use crate::error::Result;

/// Host operations every cluster kind supports.
///
/// Implementations wrap transport failures into
/// [`ApiError`](crate::error::ApiError); the orchestrator surfaces them
/// verbatim and stops at the failing step.
#[async_trait]
pub trait ClusterHostService<C: HostComparator>: Send + Sync {
    /// Lists all hosts of the cluster as the remote system sees them.
    async fn list_hosts(&self, cluster_id: &str) -> Result<Vec<C::ApiHost>>;

    /// Creates the given hosts in the cluster.
    async fn create_hosts(&self, cluster_id: &str, specs: Vec<C::CreateSpec>) -> Result<()>;

    /// Applies the given host updates.
    async fn update_hosts(&self, cluster_id: &str, updates: Vec<C::UpdateSpec>) -> Result<()>;

    /// Deletes the hosts with the given FQDNs.
    async fn delete_hosts(&self, cluster_id: &str, fqdns: Vec<String>) -> Result<()>;
}

/// Additional operations for cluster kinds with shard lifecycle.
#[async_trait]
pub trait ShardedClusterHostService<C: HostComparator>: ClusterHostService<C> {
    /// Creates a shard together with its initial host group.
    async fn create_shard(
        &self,
        cluster_id: &str,
        shard: &str,
        specs: Vec<C::CreateSpec>,
    ) -> Result<()>;

    /// Deletes a shard; the remote system removes its hosts implicitly.
    async fn delete_shard(&self, cluster_id: &str, shard: &str) -> Result<()>;
}
