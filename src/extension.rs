//! Assembly-time orchestration of policy discovery.
//!
//! The host drives three phases:
//!
//! 1. [`before_discovery`](FaultToleranceExtension::before_discovery) once,
//!    to freeze the switches and obtain interceptor binding metadata.
//! 2. [`discover`](FaultToleranceExtension::discover) per component, possibly
//!    from many threads.
//! 3. [`finalize`](FaultToleranceExtension::finalize) once, after every
//!    `discover` call has returned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::advice::{policy_marker_type, AnnotatedTypeView, InterceptorBindingType};
use crate::config::ConfigSource;
use crate::error::{FaultToleranceError, Result};
use crate::gate::EnablementGate;
use crate::metrics::FaultToleranceMetrics;
use crate::model::{ManagedComponent, PolicyKind, TypeDescriptor};
use crate::proxy;
use crate::registrar::{FinalizeReport, MetricsRegistrar};
use crate::registry::MethodRegistry;
use crate::validation::PolicyValidators;

/// Discovers fault tolerance methods and registers their metrics.
pub struct FaultToleranceExtension {
    gate: Arc<EnablementGate>,
    registry: MethodRegistry,
    registrar: MetricsRegistrar,
    finalized: AtomicBool,
}

impl FaultToleranceExtension {
    /// Extension using the process-wide gate and default validators.
    pub fn new(backend: Arc<dyn FaultToleranceMetrics>) -> Self {
        Self::builder(backend).build()
    }

    pub fn builder(backend: Arc<dyn FaultToleranceMetrics>) -> ExtensionBuilder {
        ExtensionBuilder {
            backend,
            gate: None,
            validators: PolicyValidators::default(),
        }
    }

    pub fn gate(&self) -> &Arc<EnablementGate> {
        &self.gate
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// Freeze the switches and return binding metadata for each active policy.
    pub fn before_discovery(
        &self,
        config: &dyn ConfigSource,
    ) -> Vec<InterceptorBindingType<Arc<TypeDescriptor>>> {
        self.before_discovery_with(config, policy_marker_type)
    }

    /// Like [`before_discovery`](Self::before_discovery), with the host
    /// supplying the metadata view for each policy marker type.
    pub fn before_discovery_with<D, F>(
        &self,
        config: &dyn ConfigSource,
        mut marker_type: F,
    ) -> Vec<InterceptorBindingType<D>>
    where
        D: AnnotatedTypeView,
        F: FnMut(PolicyKind) -> D,
    {
        self.gate.initialize(config);

        let bindings: Vec<_> = PolicyKind::ALL
            .into_iter()
            .filter(|kind| self.gate.allows(*kind))
            .map(|kind| InterceptorBindingType::new(marker_type(kind)))
            .collect();

        info!(bindings = bindings.len(), "Interceptor bindings prepared");
        bindings
    }

    /// Register every fault tolerance method visible on `component`.
    ///
    /// Returns the number of operations newly added to the registry.
    pub fn discover(&self, component: &ManagedComponent) -> usize {
        let mut added = 0;
        for operation in component.operations() {
            let operation = proxy::resolve_operation(&operation);
            if self.registry.register(operation, &self.gate) {
                added += 1;
            }
        }
        debug!(
            component = %proxy::real_class_of(component).name(),
            added,
            "Component discovered"
        );
        added
    }

    /// Validate every registered method and register its metrics.
    ///
    /// Runs once; later calls fail with [`FaultToleranceError::AlreadyFinalized`]
    /// and make no backend calls.
    pub fn finalize(&self) -> Result<FinalizeReport> {
        if self.finalized.swap(true, Ordering::SeqCst) {
            return Err(FaultToleranceError::AlreadyFinalized);
        }
        info!(
            methods = self.registry.len(),
            "Finalizing fault tolerance registration"
        );
        self.registrar.finalize(&self.registry, &self.gate)
    }
}

/// Builder for [`FaultToleranceExtension`].
pub struct ExtensionBuilder {
    backend: Arc<dyn FaultToleranceMetrics>,
    gate: Option<Arc<EnablementGate>>,
    validators: PolicyValidators,
}

impl ExtensionBuilder {
    /// Use `gate` instead of the process-wide one.
    pub fn gate(mut self, gate: Arc<EnablementGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn validators(mut self, validators: PolicyValidators) -> Self {
        self.validators = validators;
        self
    }

    pub fn build(self) -> FaultToleranceExtension {
        FaultToleranceExtension {
            gate: self.gate.unwrap_or_else(EnablementGate::global),
            registry: MethodRegistry::new(),
            registrar: MetricsRegistrar::with_validators(self.backend, self.validators),
            finalized: AtomicBool::new(false),
        }
    }
}
