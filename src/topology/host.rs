//! Host representation and attribute matching primitives.
//!
//! A [`Host`] is one named member of a cluster. Its attributes are split
//! into the set the remote system can change in place (`mutable`) and the
//! set it cannot (`immutable`, e.g. zone or subnet). The split is what
//! drives full vs partial matching during label correspondence resolution.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Map key identifying a host within one topology.
///
/// Labels are user-assigned and carry no stable identity across plan and
/// state; the matcher exists precisely because of that.
pub type Label = String;

/// Attribute name to value mapping.
///
/// `Value::Null` and absent keys both mean "unset" and act as wildcards
/// during matching.
pub type AttrMap = BTreeMap<String, Value>;

/// A named cluster member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    /// Fully-qualified name assigned by the remote system.
    ///
    /// `None` for hosts that have not been created yet.
    #[serde(default)]
    pub fqdn: Option<String>,
    /// Owning shard name; the empty string denotes an unsharded cluster.
    #[serde(default)]
    pub shard: String,
    /// Attributes an update call cannot change.
    #[serde(default)]
    pub immutable: AttrMap,
    /// Attributes an update call can change.
    #[serde(default)]
    pub mutable: AttrMap,
}

impl Host {
    /// Creates a new host with no FQDN, no shard, and no attributes.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fqdn: None,
            shard: String::new(),
            immutable: AttrMap::new(),
            mutable: AttrMap::new(),
        }
    }

    /// Sets the FQDN.
    #[must_use]
    pub fn with_fqdn(mut self, fqdn: &str) -> Self {
        self.fqdn = Some(fqdn.to_string());
        self
    }

    /// Sets the owning shard.
    #[must_use]
    pub fn with_shard(mut self, shard: &str) -> Self {
        self.shard = shard.to_string();
        self
    }

    /// Adds an immutable attribute.
    #[must_use]
    pub fn with_immutable(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.immutable.insert(key.to_string(), value.into());
        self
    }

    /// Adds a mutable attribute.
    #[must_use]
    pub fn with_mutable(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.mutable.insert(key.to_string(), value.into());
        self
    }

    /// Returns true if the remote system has assigned an FQDN.
    #[must_use]
    pub const fn has_fqdn(&self) -> bool {
        self.fqdn.is_some()
    }

    /// Returns true if this host belongs to a named shard.
    #[must_use]
    pub fn is_sharded(&self) -> bool {
        !self.shard.is_empty()
    }

    /// Merges immutable and mutable attributes into one map.
    ///
    /// Used when building creation payloads, which do not distinguish the
    /// two classes.
    #[must_use]
    pub fn all_attributes(&self) -> AttrMap {
        let mut merged = self.immutable.clone();
        merged.extend(self.mutable.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

/// Compares two attribute maps, treating unset values as wildcards.
///
/// A key only disqualifies the pair when it is present and non-null on both
/// sides with different values.
#[must_use]
pub fn attrs_agree(a: &AttrMap, b: &AttrMap) -> bool {
    a.iter().all(|(key, left)| {
        if left.is_null() {
            return true;
        }
        match b.get(key) {
            Some(right) if !right.is_null() => left == right,
            _ => true,
        }
    })
}

/// Returns the keys on which two attribute maps concretely disagree.
///
/// Wildcard semantics match [`attrs_agree`]: a key counts only when both
/// sides carry a non-null value.
#[must_use]
pub fn disagreeing_keys(a: &AttrMap, b: &AttrMap) -> Vec<String> {
    a.iter()
        .filter(|(key, left)| {
            if left.is_null() {
                return false;
            }
            matches!(b.get(*key), Some(right) if !right.is_null() && right != *left)
        })
        .map(|(key, _)| key.clone())
        .collect()
}
