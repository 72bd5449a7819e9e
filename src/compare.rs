//! Comparator strategy for per-cluster-kind matching semantics.
//!
//! The engine never inspects cluster-specific wire types directly. Each
//! cluster kind (MySQL, PostgreSQL, Redis, ...) supplies a [`HostComparator`]
//! that decides when two hosts are the same machine, computes update
//! payloads, and converts between [`Host`] and the wire representations its
//! API client speaks.
//!
//! [`AttributeComparator`] is the stock implementation for cluster kinds
//! whose hosts are fully described by attribute maps.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigurationError, Result};
use crate::topology::{attrs_agree, disagreeing_keys, AttrMap, Host};

/// Matching and conversion semantics for one cluster kind.
pub trait HostComparator {
    /// Creation payload accepted by the cluster API.
    type CreateSpec: Clone + Send + Sync;
    /// Update payload accepted by the cluster API.
    type UpdateSpec: Clone + Send + Sync;
    /// Host representation returned by the cluster API.
    type ApiHost: Clone + Send + Sync;

    /// Returns true if all attributes agree, unset values acting as
    /// wildcards.
    fn fully_match(&self, desired: &Host, observed: &Host) -> bool;

    /// Returns true if the immutable attributes agree.
    ///
    /// A partial match identifies the same machine in a configuration that
    /// can be converged with an update call instead of destroy-and-recreate.
    fn partial_match(&self, desired: &Host, observed: &Host) -> bool;

    /// Computes the update payload converging `observed` towards `desired`.
    ///
    /// Returns `Ok(None)` when the hosts already agree.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if an immutable attribute differs;
    /// matching is expected to have prevented such a pairing, but the
    /// comparator is the final authority.
    fn changes(&self, desired: &Host, observed: &Host) -> Result<Option<Self::UpdateSpec>>;

    /// Converts a host into a creation payload.
    fn to_create_spec(&self, host: &Host) -> Self::CreateSpec;

    /// Converts an API host into the engine's host representation.
    fn from_api_host(&self, api: &Self::ApiHost) -> Host;
}

/// Creation payload for attribute-map cluster kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSpec {
    /// Shard the host is created into; empty for unsharded clusters.
    #[serde(default)]
    pub shard: String,
    /// Merged immutable and mutable attributes.
    pub attributes: AttrMap,
}

/// Update payload for attribute-map cluster kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostUpdate {
    /// FQDN of the host being updated.
    pub fqdn: String,
    /// New values for the attributes being changed.
    pub attributes: AttrMap,
    /// Update-mask paths naming the changed attributes.
    pub update_paths: Vec<String>,
}

/// Wire host representation for attribute-map cluster kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireHost {
    /// FQDN assigned by the remote system; empty if not yet known.
    #[serde(default)]
    pub fqdn: String,
    /// Owning shard name.
    #[serde(default)]
    pub shard: String,
    /// Attributes the remote system cannot change in place.
    #[serde(default)]
    pub immutable: AttrMap,
    /// Attributes the remote system can change in place.
    #[serde(default)]
    pub mutable: AttrMap,
}

/// Stock comparator for cluster kinds described by attribute maps.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeComparator;

impl AttributeComparator {
    /// Creates a new attribute comparator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Shard names agree when equal or when either side leaves it unset.
    fn shards_compatible(desired: &Host, observed: &Host) -> bool {
        desired.shard.is_empty() || observed.shard.is_empty() || desired.shard == observed.shard
    }
}

impl HostComparator for AttributeComparator {
    type CreateSpec = HostSpec;
    type UpdateSpec = HostUpdate;
    type ApiHost = WireHost;

    fn fully_match(&self, desired: &Host, observed: &Host) -> bool {
        Self::shards_compatible(desired, observed)
            && attrs_agree(&desired.immutable, &observed.immutable)
            && attrs_agree(&desired.mutable, &observed.mutable)
    }

    fn partial_match(&self, desired: &Host, observed: &Host) -> bool {
        Self::shards_compatible(desired, observed)
            && attrs_agree(&desired.immutable, &observed.immutable)
    }

    fn changes(&self, desired: &Host, observed: &Host) -> Result<Option<HostUpdate>> {
        let fqdn = observed.fqdn.clone().unwrap_or_default();

        let immutable_conflicts = disagreeing_keys(&desired.immutable, &observed.immutable);
        if let Some(field) = immutable_conflicts.first() {
            return Err(ConfigurationError::immutable_changed(fqdn, field).into());
        }

        let changed = disagreeing_keys(&desired.mutable, &observed.mutable);
        if changed.is_empty() {
            return Ok(None);
        }

        debug!("Host {fqdn} changed attributes: {changed:?}");

        let attributes: AttrMap = changed
            .iter()
            .filter_map(|key| {
                desired
                    .mutable
                    .get(key)
                    .map(|value| (key.clone(), value.clone()))
            })
            .collect();

        Ok(Some(HostUpdate {
            fqdn,
            attributes,
            update_paths: changed,
        }))
    }

    fn to_create_spec(&self, host: &Host) -> HostSpec {
        HostSpec {
            shard: host.shard.clone(),
            attributes: host.all_attributes(),
        }
    }

    fn from_api_host(&self, api: &WireHost) -> Host {
        Host {
            fqdn: if api.fqdn.is_empty() {
                None
            } else {
                Some(api.fqdn.clone())
            },
            shard: api.shard.clone(),
            immutable: api.immutable.clone(),
            mutable: api.mutable.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_test_host(zone: &str, disk: i64) -> Host {
        Host::new()
            .with_immutable("zone", json!(zone))
            .with_mutable("disk_size", json!(disk))
    }

    #[test]
    fn test_fully_match_equal_hosts() {
        let cmp = AttributeComparator::new();
        let a = create_test_host("zone-a", 100);
        let b = create_test_host("zone-a", 100);
        assert!(cmp.fully_match(&a, &b));
    }

    #[test]
    fn test_fully_match_rejects_mutable_difference() {
        let cmp = AttributeComparator::new();
        let a = create_test_host("zone-a", 100);
        let b = create_test_host("zone-a", 200);
        assert!(!cmp.fully_match(&a, &b));
        assert!(cmp.partial_match(&a, &b));
    }

    #[test]
    fn test_partial_match_rejects_immutable_difference() {
        let cmp = AttributeComparator::new();
        let a = create_test_host("zone-a", 100);
        let b = create_test_host("zone-b", 100);
        assert!(!cmp.partial_match(&a, &b));
    }

    #[test]
    fn test_unset_attribute_is_wildcard() {
        let cmp = AttributeComparator::new();
        let a = Host::new().with_mutable("disk_size", json!(100));
        let b = Host::new().with_immutable("zone", json!("zone-a"));
        assert!(cmp.fully_match(&a, &b));
    }

    #[test]
    fn test_shard_mismatch_blocks_match() {
        let cmp = AttributeComparator::new();
        let a = create_test_host("zone-a", 100).with_shard("shard1");
        let b = create_test_host("zone-a", 100).with_shard("shard2");
        assert!(!cmp.fully_match(&a, &b));
        assert!(!cmp.partial_match(&a, &b));
    }

    #[test]
    fn test_changes_none_when_converged() {
        let cmp = AttributeComparator::new();
        let a = create_test_host("zone-a", 100);
        let b = create_test_host("zone-a", 100).with_fqdn("h1.example.com");
        let update = cmp.changes(&a, &b).unwrap();
        assert!(update.is_none());
    }

    #[test]
    fn test_changes_builds_update_mask() {
        let cmp = AttributeComparator::new();
        let desired = create_test_host("zone-a", 200);
        let observed = create_test_host("zone-a", 100).with_fqdn("h1.example.com");

        let update = cmp.changes(&desired, &observed).unwrap().unwrap();
        assert_eq!(update.fqdn, "h1.example.com");
        assert_eq!(update.update_paths, vec![String::from("disk_size")]);
        assert_eq!(update.attributes.get("disk_size"), Some(&json!(200)));
    }

    #[test]
    fn test_changes_rejects_immutable_difference() {
        let cmp = AttributeComparator::new();
        let desired = create_test_host("zone-b", 100);
        let observed = create_test_host("zone-a", 100).with_fqdn("h1.example.com");

        let err = cmp.changes(&desired, &observed).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("zone"));
    }

    #[test]
    fn test_from_api_host_empty_fqdn_is_none() {
        let cmp = AttributeComparator::new();
        let wire = WireHost {
            fqdn: String::new(),
            shard: String::from("shard1"),
            immutable: AttrMap::new(),
            mutable: AttrMap::new(),
        };
        let host = cmp.from_api_host(&wire);
        assert!(!host.has_fqdn());
        assert_eq!(host.shard, "shard1");
    }
}
