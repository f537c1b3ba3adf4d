//! Metrics backends for fault tolerance methods.
//!
//! The pipeline is a client of [`FaultToleranceMetrics`]. Backends implement
//! the single [`register`](FaultToleranceMetrics::register) primitive; the
//! per-policy calls expand the [`catalog`] and route through it.
//!
//! # Available Backends
//!
//! - [`RecordingMetrics`] - In-memory, records each name once
//! - [`OtelMetrics`] - OpenTelemetry meter instruments (feature `otel`)

pub mod catalog;
#[cfg(feature = "otel")]
mod otel;
mod recording;

pub use catalog::{MetricDescriptor, MetricType};
#[cfg(feature = "otel")]
pub use otel::OtelMetrics;
pub use recording::RecordingMetrics;

use crate::error::MetricsError;
use crate::model::{Operation, PolicyKind};

/// Registration calls offered by a metrics backend.
pub trait FaultToleranceMetrics: Send + Sync {
    /// Register one instrument.
    fn register(&self, descriptor: &MetricDescriptor) -> Result<(), MetricsError>;

    /// Baseline invocation counters.
    fn register_metrics(&self, operation: &Operation) -> Result<(), MetricsError> {
        register_all(self, catalog::baseline(operation))
    }

    fn register_retry_metrics(&self, operation: &Operation) -> Result<(), MetricsError> {
        register_all(self, catalog::for_policy(operation, PolicyKind::Retry))
    }

    fn register_circuit_breaker_metrics(&self, operation: &Operation) -> Result<(), MetricsError> {
        register_all(
            self,
            catalog::for_policy(operation, PolicyKind::CircuitBreaker),
        )
    }

    fn register_timeout_metrics(&self, operation: &Operation) -> Result<(), MetricsError> {
        register_all(self, catalog::for_policy(operation, PolicyKind::Timeout))
    }

    fn register_bulkhead_metrics(&self, operation: &Operation) -> Result<(), MetricsError> {
        register_all(self, catalog::for_policy(operation, PolicyKind::Bulkhead))
    }

    fn register_fallback_metrics(&self, operation: &Operation) -> Result<(), MetricsError> {
        register_all(self, catalog::for_policy(operation, PolicyKind::Fallback))
    }

    /// Dispatch to the registration call for `kind`.
    ///
    /// Asynchronous execution has no metrics of its own.
    fn register_policy_metrics(
        &self,
        operation: &Operation,
        kind: PolicyKind,
    ) -> Result<(), MetricsError> {
        match kind {
            PolicyKind::Retry => self.register_retry_metrics(operation),
            PolicyKind::CircuitBreaker => self.register_circuit_breaker_metrics(operation),
            PolicyKind::Timeout => self.register_timeout_metrics(operation),
            PolicyKind::Bulkhead => self.register_bulkhead_metrics(operation),
            PolicyKind::Fallback => self.register_fallback_metrics(operation),
            PolicyKind::Asynchronous => Ok(()),
        }
    }
}

fn register_all<M: FaultToleranceMetrics + ?Sized>(
    backend: &M,
    descriptors: Vec<MetricDescriptor>,
) -> Result<(), MetricsError> {
    for descriptor in &descriptors {
        backend.register(descriptor)?;
    }
    Ok(())
}
