//! Error types for the discovery pipeline.

use crate::model::PolicyKind;

/// Errors surfaced to whatever orchestrates assembly.
///
/// Every variant is fatal to assembly; nothing in this crate retries.
#[derive(Debug, thiserror::Error)]
pub enum FaultToleranceError {
    #[error("Invalid {policy} policy on {operation}: {reason}")]
    InvalidPolicy {
        operation: String,
        policy: PolicyKind,
        reason: String,
    },

    #[error("Metrics registration failed: {0}")]
    Metrics(#[from] MetricsError),

    #[error("Fault tolerance metrics were already finalized")]
    AlreadyFinalized,

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl FaultToleranceError {
    pub fn invalid(
        operation: &crate::model::Operation,
        policy: PolicyKind,
        reason: impl Into<String>,
    ) -> Self {
        FaultToleranceError::InvalidPolicy {
            operation: operation.to_string(),
            policy,
            reason: reason.into(),
        }
    }
}

/// Errors from a metrics backend.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricsError {
    #[error("Metric already registered with another instrument type: {name}")]
    AlreadyRegistered { name: String },

    #[error("Backend rejected {name}: {message}")]
    Rejected { name: String, message: String },
}

pub type Result<T> = std::result::Result<T, FaultToleranceError>;
