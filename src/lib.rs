// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Shardpilot
//!
//! A topology reconciliation engine for multi-host database clusters.
//!
//! ## Overview
//!
//! Terraform-style tooling describes cluster membership as a map from
//! user-chosen labels to hosts. Those labels are not identities: hosts get
//! renamed in configuration, and refresh can hand back different keys than
//! the ones the user wrote. Diffing such maps naively produces spurious
//! destroy-and-recreate cycles for hosts that never changed.
//!
//! Shardpilot computes the minimal set of create / update / delete
//! operations — including shard lifecycle — needed to converge a cluster
//! from its observed topology to the desired one:
//!
//! 1. **Matching**: resolve label correspondence (identity, then full
//!    attribute match, then immutable-attribute match) and relabel the
//!    observed topology.
//! 2. **Planning**: diff hosts and shards, then suppress host operations
//!    covered by shard operations.
//! 3. **Orchestration**: issue the API calls in dependency order, failing
//!    fast and leaving recovery to the next reconciliation pass.
//! 4. **Projection**: correlate API-observed hosts back to the label-keyed
//!    topology after apply.
//!
//! ## Modules
//!
//! - [`topology`]: host and topology data model
//! - [`compare`]: per-cluster-kind matching strategy
//! - [`matcher`]: label correspondence resolution
//! - [`planner`]: host/shard diffs and convergence plans
//! - [`reconciler`]: orchestration against the cluster API surface
//! - [`projector`]: post-apply state projection
//! - [`service`]: abstract cluster API traits
//! - [`error`]: error taxonomy
//!
//! ## Example
//!
//! ```ignore
//! use shardpilot::{AttributeComparator, HostReconciler, Topology};
//!
//! let cmp = AttributeComparator::new();
//! let reconciler = HostReconciler::new(&cmp, &my_api_client);
//!
//! let summary = reconciler
//!     .update_cluster_hosts_with_shards("cluster-1", &desired, &observed)
//!     .await?;
//! println!("{summary}");
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod compare;
pub mod error;
pub mod matcher;
pub mod planner;
pub mod projector;
pub mod reconciler;
pub mod service;
pub mod topology;

// ============================================================================
// Re-exports
// ============================================================================

pub use compare::{AttributeComparator, HostComparator, HostSpec, HostUpdate, WireHost};
pub use error::{ApiError, ConfigurationError, InternalError, Result, ShardPilotError};
pub use matcher::Matcher;
pub use planner::{
    suppress_shard_covered, ConvergencePlan, HostChanges, HostDiffEngine, ShardChanges,
    ShardDiffEngine,
};
pub use projector::StateProjector;
pub use reconciler::{HostReconciler, ReconcileSummary};
pub use service::{ClusterHostService, ShardedClusterHostService};
pub use topology::{attrs_agree, disagreeing_keys, AttrMap, Host, Label, Topology};
