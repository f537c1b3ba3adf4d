//! Layered configuration driving the switches.

use std::io::Write;

use serial_test::serial;

use ftpolicy::config::{self, METRICS_ENABLED_KEY, NON_FALLBACK_ENABLED_KEY};

use crate::fixtures::{catalog_service, component, extension};

#[test]
#[serial]
fn test_yaml_file_disables_non_fallback_policies() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{}: false", NON_FALLBACK_ENABLED_KEY).unwrap();
    writeln!(file, "{}: true", METRICS_ENABLED_KEY).unwrap();

    let source = config::load(file.path().to_str()).unwrap();
    let (ext, _) = extension();
    let bindings = ext.before_discovery(&source);

    assert_eq!(bindings.len(), 1);
    assert!(!ext.gate().is_ft_enabled());
    assert!(ext.gate().is_metrics_enabled());

    ext.discover(&component(&catalog_service()));
    assert_eq!(ext.registry().len(), 1);
}

#[test]
#[serial]
fn test_later_configuration_is_ignored() {
    let (ext, _) = extension();

    let mut off = tempfile::NamedTempFile::new().unwrap();
    writeln!(off, "{}: false", METRICS_ENABLED_KEY).unwrap();
    ext.before_discovery(&config::load(off.path().to_str()).unwrap());

    let mut on = tempfile::NamedTempFile::new().unwrap();
    writeln!(on, "{}: true", METRICS_ENABLED_KEY).unwrap();
    ext.before_discovery(&config::load(on.path().to_str()).unwrap());

    assert!(!ext.gate().is_metrics_enabled());
}
