//! Finalize-phase behavior: metrics registration and validation.

use ftpolicy::config::{StaticConfig, METRICS_ENABLED_KEY, NON_FALLBACK_ENABLED_KEY};
use ftpolicy::metrics::{catalog, MetricType};
use ftpolicy::model::{Marker, PolicyKind, RetryPolicy, Signature, TypeDescriptor};
use ftpolicy::FaultToleranceError;

use crate::fixtures::{catalog_service, component, extension, payment_service, risky_service};

#[test]
fn test_charge_registers_baseline_retry_and_timeout() {
    let (ext, backend) = extension();
    ext.before_discovery(&StaticConfig::new());

    let ty = payment_service();
    ext.discover(&component(&ty));
    let report = ext.finalize().unwrap();

    let charge = ty.operation("charge", &["Order"]).unwrap();
    let mut expected: Vec<String> = catalog::baseline(&charge)
        .into_iter()
        .chain(catalog::for_policy(&charge, PolicyKind::Retry))
        .chain(catalog::for_policy(&charge, PolicyKind::Timeout))
        .map(|d| d.name)
        .collect();
    let mut names = backend.names();
    expected.sort();
    names.sort();

    assert_eq!(names, expected);
    assert_eq!(report.operations, 1);
    assert_eq!(report.policy_registrations, 2);
    assert!(!backend.contains("ft.PaymentService.charge.fallback.calls.total"));
}

#[test]
fn test_invalid_timeout_aborts_before_any_registration() {
    let (ext, backend) = extension();
    ext.before_discovery(&StaticConfig::new());

    ext.discover(&component(&payment_service()));
    ext.discover(&component(&risky_service()));

    match ext.finalize() {
        Err(FaultToleranceError::InvalidPolicy {
            operation, policy, ..
        }) => {
            assert_eq!(operation, "RiskyService.risky()");
            assert_eq!(policy, PolicyKind::Timeout);
        }
        other => panic!("expected invalid policy, got {other:?}"),
    }
    assert_eq!(backend.calls(), 0);
}

#[test]
fn test_metrics_disabled_makes_zero_backend_calls() {
    let (ext, backend) = extension();
    ext.before_discovery(&StaticConfig::new().with(METRICS_ENABLED_KEY, false));

    ext.discover(&component(&payment_service()));
    ext.discover(&component(&risky_service()));
    let report = ext.finalize().unwrap();

    assert!(report.skipped);
    assert_eq!(ext.registry().len(), 2);
    assert_eq!(backend.calls(), 0);
}

#[test]
fn test_ft_disabled_registers_fallback_metrics_only() {
    let (ext, backend) = extension();
    ext.before_discovery(&StaticConfig::new().with(NON_FALLBACK_ENABLED_KEY, false));

    ext.discover(&component(&catalog_service()));
    ext.finalize().unwrap();

    assert!(backend.contains("ft.CatalogService.lookup.invocations.total"));
    assert!(backend.contains("ft.CatalogService.lookup.fallback.calls.total"));
    assert!(!backend.contains("ft.CatalogService.lookup.retry.retries.total"));
    assert!(!backend.contains("ft.CatalogService.refresh.invocations.total"));
}

#[test]
fn test_histograms_registered_for_timeout() {
    let (ext, backend) = extension();
    ext.before_discovery(&StaticConfig::new());
    ext.discover(&component(&payment_service()));
    ext.finalize().unwrap();

    let histograms: Vec<_> = backend
        .registered()
        .into_iter()
        .filter(|d| d.metric_type == MetricType::Histogram)
        .map(|d| d.name)
        .collect();
    assert_eq!(
        histograms,
        vec!["ft.PaymentService.charge.timeout.executionDuration"]
    );
}

#[test]
fn test_second_finalize_rejected() {
    let (ext, backend) = extension();
    ext.before_discovery(&StaticConfig::new());
    ext.discover(&component(&payment_service()));

    ext.finalize().unwrap();
    let calls = backend.calls();

    assert!(matches!(
        ext.finalize(),
        Err(FaultToleranceError::AlreadyFinalized)
    ));
    assert_eq!(backend.calls(), calls);
}

#[test]
fn test_overloads_share_metric_names() {
    let (ext, backend) = extension();
    ext.before_discovery(&StaticConfig::new());

    let ty = TypeDescriptor::builder("PaymentService")
        .method(
            Signature::new("charge").param("Order"),
            vec![Marker::Retry(RetryPolicy::default())],
        )
        .method(
            Signature::new("charge").param("Order").param("Currency"),
            vec![Marker::Retry(RetryPolicy::default())],
        )
        .build();
    ext.discover(&component(&ty));

    let report = ext.finalize().unwrap();

    assert_eq!(report.operations, 2);
    assert_eq!(report.policy_registrations, 2);
    // 2 baseline + 4 retry, shared by both overloads
    assert_eq!(backend.registered().len(), 6);
    assert_eq!(backend.calls(), 12);
}
