//! Declared markers and the parameters policy markers carry.
//!
//! Parameters are stored exactly as declared, so structurally invalid values
//! (negative durations, ratios above one) are representable and left for the
//! validators to reject.

use std::fmt;

use super::policy::PolicyKind;

/// Unit of a declared duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Nanos,
    Micros,
    Millis,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    fn nanos(self) -> i128 {
        match self {
            TimeUnit::Nanos => 1,
            TimeUnit::Micros => 1_000,
            TimeUnit::Millis => 1_000_000,
            TimeUnit::Seconds => 1_000_000_000,
            TimeUnit::Minutes => 60_000_000_000,
            TimeUnit::Hours => 3_600_000_000_000,
            TimeUnit::Days => 86_400_000_000_000,
        }
    }
}

/// A signed amount of time as written on a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclaredDuration {
    pub amount: i64,
    pub unit: TimeUnit,
}

impl DeclaredDuration {
    pub const fn new(amount: i64, unit: TimeUnit) -> Self {
        Self { amount, unit }
    }

    pub const fn millis(amount: i64) -> Self {
        Self::new(amount, TimeUnit::Millis)
    }

    pub const fn seconds(amount: i64) -> Self {
        Self::new(amount, TimeUnit::Seconds)
    }

    /// Total nanoseconds; wide enough that no unit overflows.
    pub fn as_nanos(&self) -> i128 {
        self.amount as i128 * self.unit.nanos()
    }

    pub fn is_negative(&self) -> bool {
        self.amount < 0
    }
}

impl fmt::Display for DeclaredDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.amount, self.unit)
    }
}

/// Parameters of a retry marker.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// `-1` retries without bound.
    pub max_retries: i32,
    pub delay: DeclaredDuration,
    /// Zero disables the overall duration limit.
    pub max_duration: DeclaredDuration,
    pub jitter: DeclaredDuration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: DeclaredDuration::millis(0),
            max_duration: DeclaredDuration::millis(180_000),
            jitter: DeclaredDuration::millis(200),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(mut self, max_retries: i32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_delay(mut self, delay: DeclaredDuration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_max_duration(mut self, max_duration: DeclaredDuration) -> Self {
        self.max_duration = max_duration;
        self
    }

    pub fn with_jitter(mut self, jitter: DeclaredDuration) -> Self {
        self.jitter = jitter;
        self
    }
}

/// Parameters of a circuit-breaker marker.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreakerPolicy {
    pub delay: DeclaredDuration,
    pub request_volume_threshold: i32,
    pub failure_ratio: f64,
    pub success_threshold: i32,
}

impl Default for CircuitBreakerPolicy {
    fn default() -> Self {
        Self {
            delay: DeclaredDuration::millis(5_000),
            request_volume_threshold: 20,
            failure_ratio: 0.5,
            success_threshold: 1,
        }
    }
}

/// Parameters of a timeout marker.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeoutPolicy {
    pub value: DeclaredDuration,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            value: DeclaredDuration::millis(1_000),
        }
    }
}

impl TimeoutPolicy {
    pub fn new(value: DeclaredDuration) -> Self {
        Self { value }
    }
}

/// Parameters of a bulkhead marker.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkheadPolicy {
    pub value: i32,
    pub waiting_task_queue: i32,
}

impl Default for BulkheadPolicy {
    fn default() -> Self {
        Self {
            value: 10,
            waiting_task_queue: 10,
        }
    }
}

/// Parameters of a fallback marker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FallbackPolicy {
    /// Name of a handler type invoked on failure.
    pub handler: Option<String>,
    /// Name of a sibling method invoked on failure.
    pub fallback_method: Option<String>,
}

impl FallbackPolicy {
    pub fn handler(handler: impl Into<String>) -> Self {
        Self {
            handler: Some(handler.into()),
            fallback_method: None,
        }
    }

    pub fn method(name: impl Into<String>) -> Self {
        Self {
            handler: None,
            fallback_method: Some(name.into()),
        }
    }
}

/// The "class" of a marker, used for presence and lookup queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Policy(PolicyKind),
    /// Synthetic binding that routes an operation to the command interceptor.
    CommandBinding,
    Named(String),
}

impl From<PolicyKind> for MarkerKind {
    fn from(kind: PolicyKind) -> Self {
        MarkerKind::Policy(kind)
    }
}

/// A declared marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Marker {
    Retry(RetryPolicy),
    CircuitBreaker(CircuitBreakerPolicy),
    Timeout(TimeoutPolicy),
    Bulkhead(BulkheadPolicy),
    Fallback(FallbackPolicy),
    Asynchronous,
    CommandBinding,
    Named(String),
}

/// Shared instance returned for every `CommandBinding` lookup.
pub static COMMAND_BINDING: Marker = Marker::CommandBinding;

impl Marker {
    pub fn named(name: impl Into<String>) -> Self {
        Marker::Named(name.into())
    }

    pub fn kind(&self) -> MarkerKind {
        match (self, self.policy_kind()) {
            (_, Some(kind)) => MarkerKind::Policy(kind),
            (Marker::Named(name), None) => MarkerKind::Named(name.clone()),
            (_, None) => MarkerKind::CommandBinding,
        }
    }

    /// The policy this marker selects, if it is a policy marker.
    pub fn policy_kind(&self) -> Option<PolicyKind> {
        match self {
            Marker::Retry(_) => Some(PolicyKind::Retry),
            Marker::CircuitBreaker(_) => Some(PolicyKind::CircuitBreaker),
            Marker::Timeout(_) => Some(PolicyKind::Timeout),
            Marker::Bulkhead(_) => Some(PolicyKind::Bulkhead),
            Marker::Fallback(_) => Some(PolicyKind::Fallback),
            Marker::Asynchronous => Some(PolicyKind::Asynchronous),
            Marker::CommandBinding | Marker::Named(_) => None,
        }
    }

    pub fn is_kind(&self, kind: &MarkerKind) -> bool {
        match (self, kind) {
            (Marker::CommandBinding, MarkerKind::CommandBinding) => true,
            (Marker::Named(a), MarkerKind::Named(b)) => a == b,
            (_, MarkerKind::Policy(p)) => self.policy_kind() == Some(*p),
            _ => false,
        }
    }
}
