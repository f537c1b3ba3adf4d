//! Integration tests for the discovery pipeline.

#[path = "pipeline/fixtures.rs"]
mod fixtures;

#[path = "pipeline/discovery_test.rs"]
mod discovery_test;

#[path = "pipeline/finalize_test.rs"]
mod finalize_test;

#[path = "pipeline/config_test.rs"]
mod config_test;
