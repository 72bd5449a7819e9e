//! Topology types for desired and observed cluster membership.
//!
//! A topology is a label-to-host mapping. Two topologies exist per
//! reconciliation pass: the desired one built from configuration, and the
//! observed one built from last-known remote state. Insertion order is
//! irrelevant; iteration is always lexicographic over labels so that the
//! matching passes behave deterministically.

mod host;

pub use host::{attrs_agree, disagreeing_keys, AttrMap, Host, Label};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A label-to-host mapping representing one side of a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    /// Hosts keyed by label.
    hosts: BTreeMap<Label, Host>,
}

impl Topology {
    /// Creates an empty topology.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            hosts: BTreeMap::new(),
        }
    }

    /// Inserts a host under the given label, replacing any previous entry.
    pub fn insert(&mut self, label: impl Into<Label>, host: Host) {
        self.hosts.insert(label.into(), host);
    }

    /// Returns the host stored under the given label.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&Host> {
        self.hosts.get(label)
    }

    /// Returns true if a host is stored under the given label.
    #[must_use]
    pub fn contains_label(&self, label: &str) -> bool {
        self.hosts.contains_key(label)
    }

    /// Returns the number of hosts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Returns true if the topology holds no hosts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Iterates over labels and hosts in lexicographic label order.
    pub fn iter(&self) -> impl Iterator<Item = (&Label, &Host)> {
        self.hosts.iter()
    }

    /// Iterates over labels in lexicographic order.
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.hosts.keys()
    }

    /// Collects the distinct shard names appearing in this topology.
    #[must_use]
    pub fn shard_names(&self) -> BTreeSet<String> {
        self.hosts.values().map(|h| h.shard.clone()).collect()
    }

    /// Groups hosts by their shard name.
    #[must_use]
    pub fn hosts_by_shard(&self) -> BTreeMap<String, Vec<Host>> {
        let mut groups: BTreeMap<String, Vec<Host>> = BTreeMap::new();
        for host in self.hosts.values() {
            groups.entry(host.shard.clone()).or_default().push(host.clone());
        }
        groups
    }
}

impl FromIterator<(Label, Host)> for Topology {
    fn from_iter<T: IntoIterator<Item = (Label, Host)>>(iter: T) -> Self {
        Self {
            hosts: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Topology {
    type Item = (Label, Host);
    type IntoIter = std::collections::btree_map::IntoIter<Label, Host>;

    fn into_iter(self) -> Self::IntoIter {
        self.hosts.into_iter()
    }
}

impl<'a> IntoIterator for &'a Topology {
    type Item = (&'a Label, &'a Host);
    type IntoIter = std::collections::btree_map::Iter<'a, Label, Host>;

    fn into_iter(self) -> Self::IntoIter {
        self.hosts.iter()
    }
}
