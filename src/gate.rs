//! Process-wide enablement switches.
//!
//! The switches are read from configuration once, at the start of assembly,
//! and frozen. Later initialization attempts are ignored.

use std::sync::{Arc, LazyLock, OnceLock};

use tracing::{info, warn};

use crate::config::{ConfigSource, METRICS_ENABLED_KEY, NON_FALLBACK_ENABLED_KEY};
use crate::model::PolicyKind;

/// Frozen values of both switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnablementState {
    pub ft_enabled: bool,
    pub metrics_enabled: bool,
}

impl Default for EnablementState {
    fn default() -> Self {
        Self {
            ft_enabled: true,
            metrics_enabled: true,
        }
    }
}

impl EnablementState {
    /// Read both switches, defaulting to enabled when a lookup is absent or fails.
    pub fn from_source(source: &dyn ConfigSource) -> Self {
        Self {
            ft_enabled: lookup_or_default(source, NON_FALLBACK_ENABLED_KEY),
            metrics_enabled: lookup_or_default(source, METRICS_ENABLED_KEY),
        }
    }
}

fn lookup_or_default(source: &dyn ConfigSource, key: &str) -> bool {
    match source.lookup_bool(key) {
        Ok(Some(value)) => value,
        Ok(None) => true,
        Err(e) => {
            warn!(key = %key, error = %e, "Config lookup failed, defaulting to enabled");
            true
        }
    }
}

/// Write-once holder for [`EnablementState`].
#[derive(Debug, Default)]
pub struct EnablementGate {
    state: OnceLock<EnablementState>,
}

static GLOBAL: LazyLock<Arc<EnablementGate>> =
    LazyLock::new(|| Arc::new(EnablementGate::new()));

impl EnablementGate {
    pub const fn new() -> Self {
        Self {
            state: OnceLock::new(),
        }
    }

    /// A gate already frozen to `state`.
    pub fn frozen(state: EnablementState) -> Self {
        let gate = Self::new();
        let _ = gate.state.set(state);
        gate
    }

    /// The process-wide gate.
    pub fn global() -> Arc<EnablementGate> {
        Arc::clone(&GLOBAL)
    }

    /// Freeze the switches from `source`.
    ///
    /// Returns `true` if this call set the values, `false` if they were already
    /// frozen (in which case `source` is not consulted).
    pub fn initialize(&self, source: &dyn ConfigSource) -> bool {
        let mut initialized = false;
        let state = self.state.get_or_init(|| {
            initialized = true;
            EnablementState::from_source(source)
        });

        if initialized {
            info!(
                ft_enabled = state.ft_enabled,
                metrics_enabled = state.metrics_enabled,
                "Fault tolerance switches initialized"
            );
        } else {
            warn!("Fault tolerance switches already initialized, ignoring");
        }
        initialized
    }

    pub fn is_initialized(&self) -> bool {
        self.state.get().is_some()
    }

    /// Current values; defaults if not yet initialized.
    pub fn state(&self) -> EnablementState {
        self.state.get().copied().unwrap_or_default()
    }

    pub fn is_ft_enabled(&self) -> bool {
        self.state().ft_enabled
    }

    pub fn is_metrics_enabled(&self) -> bool {
        self.state().metrics_enabled
    }

    /// Whether policies of `kind` are in effect. Fallback always is.
    pub fn allows(&self, kind: PolicyKind) -> bool {
        kind.is_fallback() || self.is_ft_enabled()
    }
}
