//! Registry of operations confirmed to carry an active policy marker.

use std::collections::HashSet;
use std::sync::{OnceLock, RwLock};

use tracing::debug;

use crate::detector;
use crate::gate::EnablementGate;
use crate::model::Operation;

/// Thread-safe, idempotent set of fault-tolerant operations.
///
/// The backing set is created on first insert. Many discovery callers may
/// insert concurrently; the single finalize pass reads a snapshot.
#[derive(Debug, Default)]
pub struct MethodRegistry {
    methods: OnceLock<RwLock<HashSet<Operation>>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn methods(&self) -> &RwLock<HashSet<Operation>> {
        self.methods.get_or_init(|| RwLock::new(HashSet::new()))
    }

    /// Add `operation` if it is a fault tolerance method under `gate`.
    ///
    /// Returns `true` only when the operation was newly inserted.
    pub fn register(&self, operation: Operation, gate: &EnablementGate) -> bool {
        if !detector::is_fault_tolerance_method(&operation, gate) {
            return false;
        }

        let mut methods = self
            .methods()
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let label = operation.to_string();
        let inserted = methods.insert(operation);
        drop(methods);

        if inserted {
            debug!(operation = %label, "Registered fault tolerance method");
        } else {
            debug!(operation = %label, "Fault tolerance method already registered");
        }
        inserted
    }

    /// A stable copy of every registered operation.
    pub fn snapshot(&self) -> HashSet<Operation> {
        match self.methods.get() {
            Some(methods) => methods
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone(),
            None => HashSet::new(),
        }
    }

    pub fn contains(&self, operation: &Operation) -> bool {
        self.methods.get().is_some_and(|methods| {
            methods
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .contains(operation)
        })
    }

    pub fn len(&self) -> usize {
        self.methods.get().map_or(0, |methods| {
            methods
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .len()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
