//! Names and shapes of every fault tolerance metric.
//!
//! Names follow `ft.<type>.<method>.<suffix>`, one instrument set per
//! operation. Overloads of one method share a name.

use crate::model::{Operation, PolicyKind};

/// Instrument shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
}

/// A metric to be registered for one operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricDescriptor {
    pub name: String,
    pub metric_type: MetricType,
    pub description: &'static str,
    pub unit: Option<&'static str>,
}

struct Template {
    suffix: &'static str,
    metric_type: MetricType,
    description: &'static str,
    unit: Option<&'static str>,
}

const fn counter(suffix: &'static str, description: &'static str) -> Template {
    Template {
        suffix,
        metric_type: MetricType::Counter,
        description,
        unit: None,
    }
}

const fn gauge(suffix: &'static str, description: &'static str) -> Template {
    Template {
        suffix,
        metric_type: MetricType::Gauge,
        description,
        unit: None,
    }
}

const fn histogram(suffix: &'static str, description: &'static str) -> Template {
    Template {
        suffix,
        metric_type: MetricType::Histogram,
        description,
        unit: Some("ns"),
    }
}

// ============================================================================
// Baseline
// ============================================================================

const BASELINE: &[Template] = &[
    counter("invocations.total", "Number of times the method was called"),
    counter(
        "invocations.failed.total",
        "Number of times the method was called and, after all fault tolerance \
         actions had been processed, threw an error",
    ),
];

// ============================================================================
// Per policy
// ============================================================================

const RETRY: &[Template] = &[
    counter(
        "retry.callsSucceededNotRetried.total",
        "Number of times the method was called and succeeded without retrying",
    ),
    counter(
        "retry.callsSucceededRetried.total",
        "Number of times the method was called and succeeded after retrying at least once",
    ),
    counter(
        "retry.callsFailed.total",
        "Number of times the method was called and ultimately failed after retrying",
    ),
    counter("retry.retries.total", "Total number of times the method was retried"),
];

const TIMEOUT: &[Template] = &[
    histogram("timeout.executionDuration", "Time taken to execute the method"),
    counter(
        "timeout.callsTimedOut.total",
        "Number of times the method timed out",
    ),
    counter(
        "timeout.callsNotTimedOut.total",
        "Number of times the method completed without timing out",
    ),
];

const CIRCUIT_BREAKER: &[Template] = &[
    counter(
        "circuitbreaker.callsSucceeded.total",
        "Number of calls allowed to run by the circuit breaker that returned successfully",
    ),
    counter(
        "circuitbreaker.callsFailed.total",
        "Number of calls allowed to run by the circuit breaker that then failed",
    ),
    counter(
        "circuitbreaker.callsPrevented.total",
        "Number of calls prevented from running by an open or half-open circuit breaker",
    ),
    counter(
        "circuitbreaker.opened.total",
        "Number of times the circuit breaker has moved from closed to open",
    ),
    gauge("circuitbreaker.open.total", "Time spent in open state"),
    gauge("circuitbreaker.halfOpen.total", "Time spent in half-open state"),
    gauge("circuitbreaker.closed.total", "Time spent in closed state"),
];

const BULKHEAD: &[Template] = &[
    gauge(
        "bulkhead.concurrentExecutions",
        "Number of currently running executions",
    ),
    counter(
        "bulkhead.callsAccepted.total",
        "Number of calls accepted by the bulkhead",
    ),
    counter(
        "bulkhead.callsRejected.total",
        "Number of calls rejected by the bulkhead",
    ),
    histogram(
        "bulkhead.executionDuration",
        "Time taken to execute the method while holding a bulkhead slot",
    ),
    gauge(
        "bulkhead.waitingQueue.population",
        "Number of executions currently waiting in the queue",
    ),
    histogram(
        "bulkhead.waiting.duration",
        "Time executions spent waiting in the queue",
    ),
];

const FALLBACK: &[Template] = &[counter(
    "fallback.calls.total",
    "Number of times the fallback handler or method was called",
)];

fn templates(kind: PolicyKind) -> &'static [Template] {
    match kind {
        PolicyKind::Retry => RETRY,
        PolicyKind::CircuitBreaker => CIRCUIT_BREAKER,
        PolicyKind::Timeout => TIMEOUT,
        PolicyKind::Bulkhead => BULKHEAD,
        PolicyKind::Fallback => FALLBACK,
        PolicyKind::Asynchronous => &[],
    }
}

/// Prefix shared by every metric of `operation`.
pub fn metric_prefix(operation: &Operation) -> String {
    format!(
        "ft.{}.{}",
        operation.declaring_type().name(),
        operation.name()
    )
}

fn expand(operation: &Operation, templates: &[Template]) -> Vec<MetricDescriptor> {
    let prefix = metric_prefix(operation);
    templates
        .iter()
        .map(|t| MetricDescriptor {
            name: format!("{prefix}.{}", t.suffix),
            metric_type: t.metric_type,
            description: t.description,
            unit: t.unit,
        })
        .collect()
}

/// Counters every fault tolerance method gets.
pub fn baseline(operation: &Operation) -> Vec<MetricDescriptor> {
    expand(operation, BASELINE)
}

/// Metrics specific to `kind`. Empty for kinds without metrics.
pub fn for_policy(operation: &Operation, kind: PolicyKind) -> Vec<MetricDescriptor> {
    expand(operation, templates(kind))
}
