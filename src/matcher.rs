//! Label correspondence resolution between desired and observed topologies.
//!
//! Terraform map keys are not stable identities: a host may be renamed in
//! configuration, or the remote system may hand back a different key on
//! refresh. The matcher rebuilds the observed topology under the desired
//! labels wherever a correspondence can be established, so that the diff
//! engines compare hosts instead of accidental key spellings.

use std::collections::BTreeSet;
use tracing::debug;

use crate::compare::HostComparator;
use crate::topology::Topology;

/// Resolves label correspondence between desired and observed topologies.
///
/// Matching runs in strict priority order: identity (same label on both
/// sides), full attribute match, then immutable-attribute ("partial") match.
/// Observed hosts claimed by an earlier pass are never revisited, and each
/// desired label is assigned at most once. Unclaimed observed hosts keep
/// their original labels and fall through to deletion in the host diff.
///
/// Both topologies iterate in lexicographic label order, so a multi-candidate
/// tie always resolves to the smallest labels. The scan is quadratic per
/// pass; cluster host counts are tens, not thousands.
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher;

impl Matcher {
    /// Creates a new matcher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Relabels the observed topology to align with the desired one.
    #[must_use]
    pub fn align<C: HostComparator>(
        &self,
        desired: &Topology,
        observed: &Topology,
        cmp: &C,
    ) -> Topology {
        let mut result = Topology::new();
        let mut used: BTreeSet<String> = BTreeSet::new();

        // Identity pass: a label present on both sides keeps its pairing.
        for (label, host) in observed {
            if desired.contains_label(label) {
                result.insert(label.clone(), host.clone());
                used.insert(label.clone());
            }
        }

        Self::assign_pass(desired, observed, cmp, &mut result, &mut used, MatchKind::Full);
        Self::assign_pass(desired, observed, cmp, &mut result, &mut used, MatchKind::Partial);

        // Leftover pass: unclaimed observed hosts keep their original label
        // and are destined for deletion.
        for (label, host) in observed {
            if !used.contains(label) {
                debug!("Observed host under label '{label}' has no desired counterpart");
                result.insert(label.clone(), host.clone());
            }
        }

        result
    }

    /// Runs one matching pass, claiming at most one observed host per
    /// unassigned desired label.
    fn assign_pass<C: HostComparator>(
        desired: &Topology,
        observed: &Topology,
        cmp: &C,
        result: &mut Topology,
        used: &mut BTreeSet<String>,
        kind: MatchKind,
    ) {
        for (observed_label, observed_host) in observed {
            if used.contains(observed_label) {
                continue;
            }

            for (desired_label, desired_host) in desired {
                if result.contains_label(desired_label) {
                    continue;
                }

                let matched = match kind {
                    MatchKind::Full => cmp.fully_match(desired_host, observed_host),
                    MatchKind::Partial => cmp.partial_match(desired_host, observed_host),
                };

                if matched {
                    debug!(
                        "Relabeling observed host '{observed_label}' to '{desired_label}' ({kind:?} match)"
                    );
                    result.insert(desired_label.clone(), observed_host.clone());
                    used.insert(observed_label.clone());
                    break;
                }
            }
        }
    }

}

/// Which comparator predicate a matching pass applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchKind {
    /// All attributes must agree.
    Full,
    /// Only immutable attributes must agree.
    Partial,
}
