//! Error types for the shardpilot reconciliation engine.
//!
//! This module provides the error hierarchy for all phases of a
//! reconciliation pass: matching, diffing, correlation, orchestration,
//! and state projection.

use thiserror::Error;

/// The main error type for the shardpilot engine.
#[derive(Debug, Error)]
pub enum ShardPilotError {
    /// Configuration-level errors that require user correction.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigurationError),

    /// Invariant violations inside the engine itself.
    #[error("Internal error: {0}")]
    Internal(#[from] InternalError),

    /// Errors reported by the external cluster API surface.
    #[error("Cluster API error: {0}")]
    Api(#[from] ApiError),
}

/// Configuration-level errors.
///
/// These indicate an inconsistency between the desired topology and what the
/// remote system can converge to. They are surfaced to the caller and never
/// retried; the user has to correct the configuration.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The empty shard name was mixed with named shards.
    #[error("unexpected empty shard name for multi-sharded cluster ({shard_count} distinct shard names)")]
    MixedShardNames {
        /// Number of distinct shard names across both topologies.
        shard_count: usize,
    },

    /// An update would change an attribute the remote system cannot change.
    #[error("immutable attribute '{field}' differs for host '{fqdn}'")]
    ImmutableAttributeChanged {
        /// FQDN of the affected host.
        fqdn: String,
        /// Name of the immutable attribute.
        field: String,
    },
}

/// Invariant violations inside the engine.
///
/// These are defect signals, not user errors: a reconciliation invariant did
/// not hold (for example, a create silently produced no matching host).
#[derive(Debug, Error)]
pub enum InternalError {
    /// A host awaiting creation could not be correlated to any API host.
    #[error("host '{label}' has no FQDN and no API host matches its attributes")]
    UncorrelatedHost {
        /// Topology label of the uncorrelated host.
        label: String,
    },

    /// A host that must be addressed by FQDN has none.
    #[error("host '{label}' is expected to carry an FQDN but has none")]
    MissingFqdn {
        /// Topology label of the affected host.
        label: String,
    },

    /// Generic invariant violation.
    #[error("{0}")]
    Other(String),
}

/// Errors reported by the external cluster API surface.
///
/// Service implementations wrap their transport errors into this type; the
/// orchestrator surfaces them verbatim and aborts the remaining sequence.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An API call failed.
    #[error("{operation} failed: {message}")]
    CallFailed {
        /// Name of the failed operation (e.g. "CreateHosts").
        operation: String,
        /// Error message from the API client.
        message: String,
    },
}

/// Result type alias for shardpilot operations.
pub type Result<T> = std::result::Result<T, ShardPilotError>;

impl ShardPilotError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(InternalError::Other(message.into()))
    }

    /// Returns true if this error requires user correction.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this error signals an engine defect.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

impl ConfigurationError {
    /// Creates an immutable-attribute mismatch error.
    #[must_use]
    pub fn immutable_changed(fqdn: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ImmutableAttributeChanged {
            fqdn: fqdn.into(),
            field: field.into(),
        }
    }
}

impl ApiError {
    /// Creates a call-failure error for the given operation.
    #[must_use]
    pub fn call_failed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CallFailed {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_classification() {
        let err = ShardPilotError::from(ConfigurationError::MixedShardNames { shard_count: 3 });
        assert!(err.is_configuration());
        assert!(!err.is_internal());
    }

    #[test]
    fn test_internal_classification() {
        let err = ShardPilotError::internal("correlation failed");
        assert!(err.is_internal());
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_api_error_message() {
        let err = ShardPilotError::from(ApiError::call_failed("CreateHosts", "quota exceeded"));
        assert!(err.to_string().contains("CreateHosts"));
        assert!(err.to_string().contains("quota exceeded"));
    }
}
