//! One-shot metrics registration over the method registry.
//!
//! Every registered operation is validated before any metric is registered:
//! an invalid declaration aborts assembly before the backend is called.
//!
//! A backend failure is also fatal, but may leave the operation being
//! registered with only part of its metrics. That operation still counts as
//! processed and is not offered to the backend again.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{debug, error, info};

use crate::detector;
use crate::error::Result;
use crate::gate::EnablementGate;
use crate::metrics::FaultToleranceMetrics;
use crate::model::{Operation, PolicySet};
use crate::registry::MethodRegistry;
use crate::validation::PolicyValidators;

/// Outcome of a finalize pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FinalizeReport {
    /// Metrics were disabled; nothing was validated or registered.
    pub skipped: bool,
    /// Operations whose metrics were registered by this pass.
    pub operations: usize,
    /// Policy-specific registration calls made by this pass.
    pub policy_registrations: usize,
    /// Operations skipped because an earlier pass already processed them.
    pub already_processed: usize,
}

/// Registers baseline and per-policy metrics for registered operations.
pub struct MetricsRegistrar {
    backend: Arc<dyn FaultToleranceMetrics>,
    validators: PolicyValidators,
    processed: Mutex<HashSet<Operation>>,
}

impl MetricsRegistrar {
    pub fn new(backend: Arc<dyn FaultToleranceMetrics>) -> Self {
        Self::with_validators(backend, PolicyValidators::default())
    }

    pub fn with_validators(
        backend: Arc<dyn FaultToleranceMetrics>,
        validators: PolicyValidators,
    ) -> Self {
        Self {
            backend,
            validators,
            processed: Mutex::new(HashSet::new()),
        }
    }

    pub fn backend(&self) -> &Arc<dyn FaultToleranceMetrics> {
        &self.backend
    }

    /// Validate and register metrics for every operation in `registry`.
    ///
    /// Does nothing when metrics are disabled. Operations processed by an
    /// earlier call are not registered again.
    pub fn finalize(
        &self,
        registry: &MethodRegistry,
        gate: &EnablementGate,
    ) -> Result<FinalizeReport> {
        if !gate.is_metrics_enabled() {
            info!("Fault tolerance metrics disabled, skipping registration");
            return Ok(FinalizeReport {
                skipped: true,
                ..Default::default()
            });
        }

        let mut operations: Vec<Operation> = registry.snapshot().into_iter().collect();
        operations.sort();
        let plan: Vec<(Operation, PolicySet)> = operations
            .into_iter()
            .map(|op| {
                let kinds = detector::classify_active(&op, gate);
                (op, kinds)
            })
            .collect();

        for (operation, kinds) in &plan {
            for kind in kinds.iter() {
                if let Err(e) = self.validators.validate(operation, kind) {
                    error!(operation = %operation, policy = %kind, error = %e, "Invalid policy");
                    return Err(e);
                }
            }
        }

        let mut report = FinalizeReport::default();
        let mut processed = self
            .processed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        for (operation, kinds) in plan {
            if !processed.insert(operation.clone()) {
                report.already_processed += 1;
                continue;
            }

            self.backend.register_metrics(&operation)?;
            for kind in kinds.iter() {
                self.backend.register_policy_metrics(&operation, kind)?;
                report.policy_registrations += 1;
            }
            debug!(operation = %operation, policies = ?kinds, "Registered fault tolerance metrics");
            report.operations += 1;
        }

        info!(
            operations = report.operations,
            policy_registrations = report.policy_registrations,
            "Fault tolerance metrics registered"
        );
        Ok(report)
    }
}
