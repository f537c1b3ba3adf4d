//! OpenTelemetry metrics backend.
//!
//! Instruments are created on a meter and kept alive for the process. A
//! second registration of the same name returns the existing instrument.

use std::collections::HashMap;
use std::sync::Mutex;

use opentelemetry::global;
use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter};
use tracing::debug;

use super::{FaultToleranceMetrics, MetricDescriptor, MetricType};
use crate::error::MetricsError;

/// Meter name used when none is given.
pub const DEFAULT_METER: &str = "ftpolicy";

#[derive(Clone)]
enum Instrument {
    Counter(Counter<u64>),
    Gauge(Gauge<u64>),
    Histogram(Histogram<f64>),
}

/// Registers fault tolerance instruments on an OpenTelemetry meter.
pub struct OtelMetrics {
    meter: Meter,
    instruments: Mutex<HashMap<String, Instrument>>,
}

impl OtelMetrics {
    /// Use the global meter provider.
    pub fn new() -> Self {
        Self::with_meter(global::meter(DEFAULT_METER))
    }

    pub fn with_meter(meter: Meter) -> Self {
        Self {
            meter,
            instruments: Mutex::new(HashMap::new()),
        }
    }

    fn instruments(&self) -> std::sync::MutexGuard<'_, HashMap<String, Instrument>> {
        self.instruments
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn counter(&self, name: &str) -> Option<Counter<u64>> {
        match self.instruments().get(name) {
            Some(Instrument::Counter(c)) => Some(c.clone()),
            _ => None,
        }
    }

    pub fn gauge(&self, name: &str) -> Option<Gauge<u64>> {
        match self.instruments().get(name) {
            Some(Instrument::Gauge(g)) => Some(g.clone()),
            _ => None,
        }
    }

    pub fn histogram(&self, name: &str) -> Option<Histogram<f64>> {
        match self.instruments().get(name) {
            Some(Instrument::Histogram(h)) => Some(h.clone()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.instruments().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn build(&self, descriptor: &MetricDescriptor) -> Instrument {
        let name = descriptor.name.clone();
        match descriptor.metric_type {
            MetricType::Counter => Instrument::Counter(
                self.meter
                    .u64_counter(name)
                    .with_description(descriptor.description)
                    .build(),
            ),
            MetricType::Gauge => Instrument::Gauge(
                self.meter
                    .u64_gauge(name)
                    .with_description(descriptor.description)
                    .build(),
            ),
            MetricType::Histogram => {
                let builder = self
                    .meter
                    .f64_histogram(name)
                    .with_description(descriptor.description);
                let builder = match descriptor.unit {
                    Some(unit) => builder.with_unit(unit),
                    None => builder,
                };
                Instrument::Histogram(builder.build())
            }
        }
    }
}

impl Default for OtelMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl FaultToleranceMetrics for OtelMetrics {
    fn register(&self, descriptor: &MetricDescriptor) -> Result<(), MetricsError> {
        let mut instruments = self.instruments();
        if let Some(existing) = instruments.get(&descriptor.name) {
            let same_shape = matches!(
                (existing, descriptor.metric_type),
                (Instrument::Counter(_), MetricType::Counter)
                    | (Instrument::Gauge(_), MetricType::Gauge)
                    | (Instrument::Histogram(_), MetricType::Histogram)
            );
            if !same_shape {
                return Err(MetricsError::Rejected {
                    name: descriptor.name.clone(),
                    message: "registered earlier with a different instrument type".into(),
                });
            }
            debug!(metric = %descriptor.name, "Reusing existing instrument");
            return Ok(());
        }

        let instrument = self.build(descriptor);
        instruments.insert(descriptor.name.clone(), instrument);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PolicyKind, Signature, TypeDescriptor};

    fn op() -> crate::model::Operation {
        TypeDescriptor::builder("PaymentService")
            .method(Signature::new("charge"), vec![])
            .build()
            .operation("charge", &[])
            .unwrap()
    }

    #[test]
    fn test_instruments_created_per_descriptor() {
        let backend = OtelMetrics::new();
        let op = op();

        backend.register_metrics(&op).unwrap();
        backend.register_timeout_metrics(&op).unwrap();

        assert_eq!(backend.len(), 5);
        assert!(backend
            .counter("ft.PaymentService.charge.invocations.total")
            .is_some());
        assert!(backend
            .histogram("ft.PaymentService.charge.timeout.executionDuration")
            .is_some());
    }

    #[test]
    fn test_reregistration_reuses_instrument() {
        let backend = OtelMetrics::new();
        let op = op();

        backend
            .register_policy_metrics(&op, PolicyKind::Bulkhead)
            .unwrap();
        backend
            .register_policy_metrics(&op, PolicyKind::Bulkhead)
            .unwrap();

        assert_eq!(backend.len(), 6);
        assert!(backend
            .gauge("ft.PaymentService.charge.bulkhead.concurrentExecutions")
            .is_some());
    }
}
