//! In-memory metrics backend.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

use super::{FaultToleranceMetrics, MetricDescriptor, MetricType};
use crate::error::MetricsError;

/// Records every distinct registration.
///
/// A repeated name with the same instrument type is accepted and recorded
/// once, so overloads sharing metric names register cleanly. A repeated name
/// with a different instrument type is rejected.
///
/// Useful where no metrics exporter is wired up, and for asserting exactly
/// which instruments assembly produced.
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    registered: Mutex<Vec<MetricDescriptor>>,
    names: Mutex<HashMap<String, MetricType>>,
    calls: Mutex<usize>,
}

impl RecordingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every accepted registration, in order.
    pub fn registered(&self) -> Vec<MetricDescriptor> {
        self.registered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.registered().into_iter().map(|d| d.name).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(name)
    }

    /// Number of `register` calls, including rejected ones.
    pub fn calls(&self) -> usize {
        *self
            .calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FaultToleranceMetrics for RecordingMetrics {
    fn register(&self, descriptor: &MetricDescriptor) -> Result<(), MetricsError> {
        *self
            .calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) += 1;

        let mut names = self
            .names
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match names.get(&descriptor.name) {
            Some(existing) if *existing == descriptor.metric_type => {
                debug!(metric = %descriptor.name, "Metric already recorded");
                return Ok(());
            }
            Some(_) => {
                return Err(MetricsError::AlreadyRegistered {
                    name: descriptor.name.clone(),
                });
            }
            None => {
                names.insert(descriptor.name.clone(), descriptor.metric_type);
            }
        }
        drop(names);

        self.registered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(descriptor.clone());
        Ok(())
    }
}
