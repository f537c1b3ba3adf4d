//! ftpolicy - Fault-Tolerance Policy Discovery
//!
//! Finds, at assembly time, the operations that declare fault tolerance
//! policy markers (retry, circuit breaker, timeout, bulkhead, fallback,
//! asynchronous execution), marks them for interception, and registers the
//! metrics each declared policy needs.

pub mod advice;
pub mod config;
pub mod detector;
pub mod error;
pub mod extension;
pub mod gate;
pub mod metrics;
pub mod model;
pub mod proxy;
pub mod registrar;
pub mod registry;
pub mod telemetry;
pub mod validation;

pub use error::{FaultToleranceError, MetricsError, Result};
pub use extension::{ExtensionBuilder, FaultToleranceExtension};
pub use gate::{EnablementGate, EnablementState};
pub use registrar::{FinalizeReport, MetricsRegistrar};
pub use registry::MethodRegistry;
