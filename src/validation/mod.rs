//! Structural validation of declared policy parameters.
//!
//! Each policy kind has a [`PolicyValidator`]. The defaults reject the
//! parameter combinations that can never configure a working policy
//! (negative durations, impossible thresholds, dangling fallback methods).
//! Validators may be replaced per kind through [`PolicyValidators::with`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::detector::effective_marker;
use crate::error::{FaultToleranceError, Result};
use crate::model::{
    BulkheadPolicy, CircuitBreakerPolicy, FallbackPolicy, Marker, Operation, PolicyKind,
    RetryPolicy, ReturnKind, TimeoutPolicy,
};

/// Error constants for validation failures.
pub mod errmsg {
    pub const RETRY_MAX_RETRIES: &str = "maxRetries must be -1 (unbounded) or greater";
    pub const RETRY_DELAY_NEGATIVE: &str = "delay must not be negative";
    pub const RETRY_MAX_DURATION_NEGATIVE: &str = "maxDuration must not be negative";
    pub const RETRY_JITTER_NEGATIVE: &str = "jitter must not be negative";
    pub const RETRY_MAX_DURATION_NOT_ABOVE_DELAY: &str = "maxDuration must be greater than delay";

    pub const CB_DELAY_NEGATIVE: &str = "delay must not be negative";
    pub const CB_FAILURE_RATIO: &str = "failureRatio must be between 0 and 1";
    pub const CB_REQUEST_VOLUME: &str = "requestVolumeThreshold must be at least 1";
    pub const CB_SUCCESS_THRESHOLD: &str = "successThreshold must be at least 1";

    pub const TIMEOUT_NOT_POSITIVE: &str = "value must be positive";

    pub const BULKHEAD_VALUE: &str = "value must be at least 1";
    pub const BULKHEAD_QUEUE: &str = "waitingTaskQueue must be at least 1";

    pub const FALLBACK_BOTH: &str = "handler and fallbackMethod are mutually exclusive";
    pub const FALLBACK_NEITHER: &str = "either handler or fallbackMethod must be set";
    pub const FALLBACK_METHOD_MISSING: &str =
        "fallbackMethod not found with matching parameter types";
    pub const FALLBACK_METHOD_RETURN: &str =
        "fallbackMethod return kind does not match the guarded operation";

    pub const ASYNC_NOT_FUTURE: &str = "asynchronous operations must return a future";
}

/// Structural check for one policy kind.
pub trait PolicyValidator: Send + Sync {
    fn kind(&self) -> PolicyKind;

    /// Fails with [`FaultToleranceError::InvalidPolicy`] if the effective
    /// declaration of this kind on `operation` is unusable.
    fn validate(&self, operation: &Operation) -> Result<()>;
}

pub struct RetryValidator;

impl RetryValidator {
    fn check(policy: &RetryPolicy) -> std::result::Result<(), &'static str> {
        if policy.max_retries < -1 {
            return Err(errmsg::RETRY_MAX_RETRIES);
        }
        if policy.delay.is_negative() {
            return Err(errmsg::RETRY_DELAY_NEGATIVE);
        }
        if policy.max_duration.is_negative() {
            return Err(errmsg::RETRY_MAX_DURATION_NEGATIVE);
        }
        if policy.jitter.is_negative() {
            return Err(errmsg::RETRY_JITTER_NEGATIVE);
        }
        if policy.max_duration.amount != 0
            && policy.max_duration.as_nanos() <= policy.delay.as_nanos()
        {
            return Err(errmsg::RETRY_MAX_DURATION_NOT_ABOVE_DELAY);
        }
        Ok(())
    }
}

impl PolicyValidator for RetryValidator {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Retry
    }

    fn validate(&self, operation: &Operation) -> Result<()> {
        match effective_marker(operation, self.kind()) {
            Some(Marker::Retry(policy)) => Self::check(policy)
                .map_err(|reason| FaultToleranceError::invalid(operation, self.kind(), reason)),
            _ => Ok(()),
        }
    }
}

pub struct CircuitBreakerValidator;

impl CircuitBreakerValidator {
    fn check(policy: &CircuitBreakerPolicy) -> std::result::Result<(), &'static str> {
        if policy.delay.is_negative() {
            return Err(errmsg::CB_DELAY_NEGATIVE);
        }
        if !(0.0..=1.0).contains(&policy.failure_ratio) {
            return Err(errmsg::CB_FAILURE_RATIO);
        }
        if policy.request_volume_threshold < 1 {
            return Err(errmsg::CB_REQUEST_VOLUME);
        }
        if policy.success_threshold < 1 {
            return Err(errmsg::CB_SUCCESS_THRESHOLD);
        }
        Ok(())
    }
}

impl PolicyValidator for CircuitBreakerValidator {
    fn kind(&self) -> PolicyKind {
        PolicyKind::CircuitBreaker
    }

    fn validate(&self, operation: &Operation) -> Result<()> {
        match effective_marker(operation, self.kind()) {
            Some(Marker::CircuitBreaker(policy)) => Self::check(policy)
                .map_err(|reason| FaultToleranceError::invalid(operation, self.kind(), reason)),
            _ => Ok(()),
        }
    }
}

pub struct TimeoutValidator;

impl TimeoutValidator {
    fn check(policy: &TimeoutPolicy) -> std::result::Result<(), &'static str> {
        if policy.value.as_nanos() <= 0 {
            return Err(errmsg::TIMEOUT_NOT_POSITIVE);
        }
        Ok(())
    }
}

impl PolicyValidator for TimeoutValidator {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Timeout
    }

    fn validate(&self, operation: &Operation) -> Result<()> {
        match effective_marker(operation, self.kind()) {
            Some(Marker::Timeout(policy)) => Self::check(policy)
                .map_err(|reason| FaultToleranceError::invalid(operation, self.kind(), reason)),
            _ => Ok(()),
        }
    }
}

pub struct BulkheadValidator;

impl BulkheadValidator {
    fn check(policy: &BulkheadPolicy) -> std::result::Result<(), &'static str> {
        if policy.value < 1 {
            return Err(errmsg::BULKHEAD_VALUE);
        }
        if policy.waiting_task_queue < 1 {
            return Err(errmsg::BULKHEAD_QUEUE);
        }
        Ok(())
    }
}

impl PolicyValidator for BulkheadValidator {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Bulkhead
    }

    fn validate(&self, operation: &Operation) -> Result<()> {
        match effective_marker(operation, self.kind()) {
            Some(Marker::Bulkhead(policy)) => Self::check(policy)
                .map_err(|reason| FaultToleranceError::invalid(operation, self.kind(), reason)),
            _ => Ok(()),
        }
    }
}

/// Checks the fallback target exists on the declaring type hierarchy with the
/// guarded operation's parameter types.
pub struct FallbackValidator;

impl FallbackValidator {
    fn check(operation: &Operation, policy: &FallbackPolicy) -> std::result::Result<(), &'static str> {
        match (&policy.handler, &policy.fallback_method) {
            (Some(_), Some(_)) => Err(errmsg::FALLBACK_BOTH),
            (None, None) => Err(errmsg::FALLBACK_NEITHER),
            (Some(_), None) => Ok(()),
            (None, Some(method)) => {
                let signature = operation.signature();
                let target = operation
                    .declaring_type()
                    .find_method(method, &signature.parameters)
                    .ok_or(errmsg::FALLBACK_METHOD_MISSING)?;
                if target.signature.returns != signature.returns {
                    return Err(errmsg::FALLBACK_METHOD_RETURN);
                }
                Ok(())
            }
        }
    }
}

impl PolicyValidator for FallbackValidator {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Fallback
    }

    fn validate(&self, operation: &Operation) -> Result<()> {
        match effective_marker(operation, self.kind()) {
            Some(Marker::Fallback(policy)) => Self::check(operation, policy)
                .map_err(|reason| FaultToleranceError::invalid(operation, self.kind(), reason)),
            _ => Ok(()),
        }
    }
}

pub struct AsynchronousValidator;

impl PolicyValidator for AsynchronousValidator {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Asynchronous
    }

    fn validate(&self, operation: &Operation) -> Result<()> {
        if effective_marker(operation, self.kind()).is_none() {
            return Ok(());
        }
        if operation.signature().returns != ReturnKind::Future {
            return Err(FaultToleranceError::invalid(
                operation,
                self.kind(),
                errmsg::ASYNC_NOT_FUTURE,
            ));
        }
        Ok(())
    }
}

/// One validator per policy kind.
#[derive(Clone)]
pub struct PolicyValidators {
    validators: HashMap<PolicyKind, Arc<dyn PolicyValidator>>,
}

impl Default for PolicyValidators {
    fn default() -> Self {
        Self::empty()
            .with(Arc::new(RetryValidator))
            .with(Arc::new(CircuitBreakerValidator))
            .with(Arc::new(TimeoutValidator))
            .with(Arc::new(BulkheadValidator))
            .with(Arc::new(FallbackValidator))
            .with(Arc::new(AsynchronousValidator))
    }
}

impl PolicyValidators {
    /// No validators; every kind passes.
    pub fn empty() -> Self {
        Self {
            validators: HashMap::new(),
        }
    }

    /// Install `validator` for its kind, replacing any previous one.
    pub fn with(mut self, validator: Arc<dyn PolicyValidator>) -> Self {
        self.validators.insert(validator.kind(), validator);
        self
    }

    pub fn validate(&self, operation: &Operation, kind: PolicyKind) -> Result<()> {
        match self.validators.get(&kind) {
            Some(validator) => validator.validate(operation),
            None => Ok(()),
        }
    }
}
