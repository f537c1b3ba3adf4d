//! Shared component fixtures.

use std::sync::Arc;

use ftpolicy::gate::EnablementGate;
use ftpolicy::metrics::RecordingMetrics;
use ftpolicy::model::{
    DeclaredDuration, FallbackPolicy, ManagedComponent, Marker, RetryPolicy, ReturnKind,
    Signature, TimeoutPolicy, TypeDescriptor,
};
use ftpolicy::FaultToleranceExtension;

/// `charge()` with Retry(maxRetries=3) and Timeout(1s), plus an unmarked `ping()`.
pub fn payment_service() -> Arc<TypeDescriptor> {
    TypeDescriptor::builder("PaymentService")
        .method(
            Signature::new("charge").param("Order"),
            vec![
                Marker::Retry(RetryPolicy::default().with_max_retries(3)),
                Marker::Timeout(TimeoutPolicy::new(DeclaredDuration::seconds(1))),
            ],
        )
        .method(Signature::new("ping").returns(ReturnKind::Unit), vec![])
        .build()
}

/// `risky()` with an invalid Timeout(-1).
pub fn risky_service() -> Arc<TypeDescriptor> {
    TypeDescriptor::builder("RiskyService")
        .method(
            Signature::new("risky"),
            vec![Marker::Timeout(TimeoutPolicy::new(DeclaredDuration::millis(
                -1,
            )))],
        )
        .build()
}

/// `lookup()` with both Retry and Fallback, plus its fallback method.
pub fn catalog_service() -> Arc<TypeDescriptor> {
    TypeDescriptor::builder("CatalogService")
        .method(
            Signature::new("lookup").param("Sku"),
            vec![
                Marker::Retry(RetryPolicy::default()),
                Marker::Fallback(FallbackPolicy::method("cachedLookup")),
            ],
        )
        .method(Signature::new("cachedLookup").param("Sku"), vec![])
        .method(
            Signature::new("refresh"),
            vec![Marker::Retry(RetryPolicy::default())],
        )
        .build()
}

pub fn component(ty: &Arc<TypeDescriptor>) -> ManagedComponent {
    ManagedComponent::new(Arc::clone(ty))
}

/// Extension with a private gate and an in-memory backend.
pub fn extension() -> (FaultToleranceExtension, Arc<RecordingMetrics>) {
    let backend = Arc::new(RecordingMetrics::new());
    let ext = FaultToleranceExtension::builder(backend.clone())
        .gate(Arc::new(EnablementGate::new()))
        .build();
    (ext, backend)
}
