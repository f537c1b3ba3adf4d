//! Discovery-phase behavior: classification, deduplication, proxies.

use std::sync::Arc;

use ftpolicy::config::{StaticConfig, NON_FALLBACK_ENABLED_KEY};
use ftpolicy::detector;
use ftpolicy::model::{
    ManagedComponent, Marker, PolicyKind, RetryPolicy, Signature, TypeDescriptor,
};
use ftpolicy::proxy;

use crate::fixtures::{catalog_service, component, extension, payment_service};

#[test]
fn test_unmarked_operations_are_not_registered() {
    let (ext, _) = extension();
    ext.before_discovery(&StaticConfig::new());

    let ty = payment_service();
    ext.discover(&component(&ty));

    let ping = ty.operation("ping", &[]).unwrap();
    assert!(detector::classify(&ping).is_empty());
    assert!(!ext.registry().contains(&ping));
    assert!(ext
        .registry()
        .contains(&ty.operation("charge", &["Order"]).unwrap()));
}

#[test]
fn test_inherited_method_seen_through_two_subtypes_registers_once() {
    let (ext, _) = extension();
    ext.before_discovery(&StaticConfig::new());

    let base = TypeDescriptor::builder("BaseRepository")
        .method(
            Signature::new("save").param("Entity"),
            vec![Marker::Retry(RetryPolicy::default())],
        )
        .build();
    let users = TypeDescriptor::builder("UserRepository")
        .extends(&base)
        .build();
    let orders = TypeDescriptor::builder("OrderRepository")
        .extends(&base)
        .build();

    assert_eq!(ext.discover(&ManagedComponent::new(users)), 1);
    assert_eq!(ext.discover(&ManagedComponent::new(orders)), 0);
    assert_eq!(ext.registry().len(), 1);
}

#[test]
fn test_concurrent_discovery_is_idempotent() {
    let (ext, _) = extension();
    ext.before_discovery(&StaticConfig::new());

    let payment = payment_service();
    let catalog = catalog_service();

    std::thread::scope(|s| {
        for i in 0..32 {
            let ty = if i % 2 == 0 { &payment } else { &catalog };
            let proxied = TypeDescriptor::proxy_of(ty, format!("{}$Proxy{i}", ty.name()));
            let ext = &ext;
            s.spawn(move || ext.discover(&ManagedComponent::new(proxied)));
        }
    });

    // charge, lookup, refresh
    assert_eq!(ext.registry().len(), 3);
    for op in ext.registry().snapshot() {
        assert!(!op.declaring_type().is_synthetic(), "{op}");
    }
}

#[test]
fn test_ft_disabled_registers_fallback_methods_only() {
    let (ext, _) = extension();
    ext.before_discovery(&StaticConfig::new().with(NON_FALLBACK_ENABLED_KEY, false));

    let catalog = catalog_service();
    ext.discover(&component(&catalog));
    ext.discover(&component(&payment_service()));

    let lookup = catalog.operation("lookup", &["Sku"]).unwrap();
    let snapshot = ext.registry().snapshot();
    assert_eq!(snapshot.len(), 1);
    assert!(snapshot.contains(&lookup));

    // Full classification still sees both kinds.
    assert_eq!(detector::classify(&lookup).len(), 2);
    let active: Vec<_> = detector::classify_active(&lookup, ext.gate()).iter().collect();
    assert_eq!(active, vec![PolicyKind::Fallback]);
}

#[test]
fn test_real_class_matches_root_for_any_proxy_depth() {
    let root = payment_service();
    let direct = proxy::real_class_of(&component(&root));

    let mut ty = Arc::clone(&root);
    for depth in 0..6 {
        assert_eq!(proxy::real_class_of(&component(&ty)), direct, "depth {depth}");
        ty = TypeDescriptor::proxy_of(&ty, format!("PaymentService$$Enhancer{depth}"));
    }
}

#[test]
fn test_unmarked_override_hides_marked_supertype_method() {
    let (ext, _) = extension();
    ext.before_discovery(&StaticConfig::new());

    let base = TypeDescriptor::builder("BaseRepository")
        .method(
            Signature::new("save").param("Entity"),
            vec![Marker::Retry(RetryPolicy::default())],
        )
        .build();
    let child = TypeDescriptor::builder("AuditRepository")
        .extends(&base)
        .method(Signature::new("save").param("Entity"), vec![])
        .build();

    assert_eq!(ext.discover(&ManagedComponent::new(Arc::clone(&child))), 0);

    let proxied = TypeDescriptor::proxy_of(&child, "AuditRepository$Proxy");
    assert_eq!(ext.discover(&ManagedComponent::new(proxied)), 0);
    assert!(ext.registry().is_empty());

    // The base type on its own still exposes its marked declaration.
    assert_eq!(ext.discover(&ManagedComponent::new(base)), 1);
}
