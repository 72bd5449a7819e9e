//! Host-level diff computation.
//!
//! Operates on the desired topology and the relabeled observed topology
//! produced by the matcher: after alignment, label comparison is meaningful
//! and each label resolves to create, update, delete, or no action.

use tracing::{debug, warn};

use crate::compare::HostComparator;
use crate::error::{InternalError, Result};
use crate::topology::{Host, Topology};

/// Host-level operation sets for one reconciliation pass.
///
/// Ephemeral: produced by the diff, filtered by the correlator, consumed by
/// the orchestrator, never persisted.
#[derive(Debug, Clone)]
pub struct HostChanges<U> {
    /// Hosts to create, as desired-topology entries.
    pub to_create: Vec<Host>,
    /// Update payloads for hosts present on both sides with drifted
    /// mutable attributes.
    pub to_update: Vec<U>,
    /// FQDNs of hosts to delete.
    pub to_delete: Vec<String>,
}

impl<U> HostChanges<U> {
    /// Creates an empty operation set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            to_create: Vec::new(),
            to_update: Vec::new(),
            to_delete: Vec::new(),
        }
    }

    /// Returns true if no host-level operation is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    /// Returns the total number of pending operations.
    #[must_use]
    pub fn total(&self) -> usize {
        self.to_create.len() + self.to_update.len() + self.to_delete.len()
    }
}

impl<U> Default for HostChanges<U> {
    fn default() -> Self {
        Self::new()
    }
}

/// Engine computing per-host create/update/delete sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostDiffEngine;

impl HostDiffEngine {
    /// Creates a new host diff engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes host-level operations converging `observed` to `desired`.
    ///
    /// `observed` is expected to be the matcher's relabeled topology, so
    /// that label membership is the only correspondence check needed here.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a label pair differs on immutable
    /// attributes (the comparator is the final authority on this), or an
    /// internal error if a host slated for update carries no FQDN.
    pub fn diff<C: HostComparator>(
        &self,
        desired: &Topology,
        observed: &Topology,
        cmp: &C,
    ) -> Result<HostChanges<C::UpdateSpec>> {
        let mut changes = HostChanges::new();

        for (label, desired_host) in desired {
            match observed.get(label) {
                None => {
                    debug!("Host '{label}' is not observed, scheduling create");
                    changes.to_create.push(desired_host.clone());
                }
                Some(observed_host) => {
                    if let Some(update) = cmp.changes(desired_host, observed_host)? {
                        if observed_host.fqdn.is_none() {
                            return Err(InternalError::MissingFqdn {
                                label: label.clone(),
                            }
                            .into());
                        }
                        debug!("Host '{label}' drifted, scheduling update");
                        changes.to_update.push(update);
                    }
                }
            }
        }

        for (label, observed_host) in observed {
            if desired.contains_label(label) {
                continue;
            }
            match &observed_host.fqdn {
                Some(fqdn) => {
                    debug!("Host '{label}' is no longer desired, scheduling delete of {fqdn}");
                    changes.to_delete.push(fqdn.clone());
                }
                None => {
                    warn!("Host '{label}' is no longer desired but has no FQDN to delete by");
                }
            }
        }

        Ok(changes)
    }
}
