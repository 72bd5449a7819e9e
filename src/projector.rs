//! Projection of API-observed hosts back into the label-keyed topology.
//!
//! After an apply, the remote system is the source of truth for host
//! attributes, but Terraform state is keyed by user-chosen labels the API
//! knows nothing about. The projector correlates each API host back to a
//! prior-state label — by FQDN when known, by full attribute match for
//! hosts whose creation was still in flight — and adopts the rest.

use tracing::{debug, warn};

use crate::compare::HostComparator;
use crate::error::{InternalError, Result};
use crate::topology::{Host, Topology};

/// Correlates API-observed hosts with a prior label-keyed topology.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateProjector;

impl StateProjector {
    /// Creates a new state projector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds the refreshed topology from the API host listing.
    ///
    /// Prior hosts with an FQDN correlate by FQDN; a prior host whose FQDN
    /// no longer exists remotely was deleted out-of-band and is dropped
    /// from the result. Prior hosts without an FQDN correlate by full
    /// attribute match against hosts no other label has claimed. API hosts
    /// claimed by no label are adopted under their FQDN as a new label.
    ///
    /// # Errors
    ///
    /// Returns an internal error if a prior host without an FQDN matches no
    /// unclaimed API host: the create that should have produced it left no
    /// trace, which is an engine defect rather than a user error.
    pub fn project<C: HostComparator>(
        &self,
        api_hosts: &[C::ApiHost],
        prior: &Topology,
        cmp: &C,
    ) -> Result<Topology> {
        let remote: Vec<Host> = api_hosts.iter().map(|h| cmp.from_api_host(h)).collect();
        let mut claimed = vec![false; remote.len()];
        let mut result = Topology::new();

        // FQDN correlation for hosts the state already tracks.
        for (label, prior_host) in prior {
            let Some(fqdn) = &prior_host.fqdn else {
                continue;
            };
            let found = remote
                .iter()
                .enumerate()
                .find(|(idx, host)| !claimed[*idx] && host.fqdn.as_ref() == Some(fqdn));
            match found {
                Some((idx, host)) => {
                    claimed[idx] = true;
                    result.insert(label.clone(), host.clone());
                }
                None => {
                    debug!("Host '{label}' ({fqdn}) no longer exists remotely, dropping");
                }
            }
        }

        // Attribute correlation for hosts still being created.
        for (label, prior_host) in prior {
            if prior_host.fqdn.is_some() {
                continue;
            }
            let found = remote
                .iter()
                .enumerate()
                .find(|(idx, host)| !claimed[*idx] && cmp.fully_match(prior_host, host));
            match found {
                Some((idx, host)) => {
                    debug!(
                        "Host '{label}' correlated by attributes to {:?}",
                        host.fqdn
                    );
                    claimed[idx] = true;
                    result.insert(label.clone(), host.clone());
                }
                None => {
                    return Err(InternalError::UncorrelatedHost {
                        label: label.clone(),
                    }
                    .into());
                }
            }
        }

        // Hosts the state never tracked, e.g. created out-of-band.
        for (idx, host) in remote.iter().enumerate() {
            if claimed[idx] {
                continue;
            }
            match &host.fqdn {
                Some(fqdn) => {
                    debug!("Adopting untracked host {fqdn}");
                    result.insert(fqdn.clone(), host.clone());
                }
                None => {
                    warn!("Ignoring untracked API host with no FQDN");
                }
            }
        }

        Ok(result)
    }
}
