//! Policy kinds and the sets an operation carries.

use std::fmt;

/// One fault-tolerance behavior a marker can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PolicyKind {
    Retry,
    CircuitBreaker,
    Timeout,
    Bulkhead,
    Fallback,
    Asynchronous,
}

impl PolicyKind {
    /// All kinds, in detection order.
    pub const ALL: [PolicyKind; 6] = [
        PolicyKind::Retry,
        PolicyKind::CircuitBreaker,
        PolicyKind::Timeout,
        PolicyKind::Bulkhead,
        PolicyKind::Fallback,
        PolicyKind::Asynchronous,
    ];

    /// Whether a marker of this kind on the declaring type applies to its methods.
    ///
    /// Fallback is method-only; everything else may be declared on the type.
    pub fn applies_at_type_level(self) -> bool {
        !matches!(self, PolicyKind::Fallback)
    }

    /// Whether this kind stays active when non-fallback policies are disabled.
    pub fn is_fallback(self) -> bool {
        matches!(self, PolicyKind::Fallback)
    }

    /// Short lowercase name used in metric names and log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Retry => "retry",
            PolicyKind::CircuitBreaker => "circuitbreaker",
            PolicyKind::Timeout => "timeout",
            PolicyKind::Bulkhead => "bulkhead",
            PolicyKind::Fallback => "fallback",
            PolicyKind::Asynchronous => "asynchronous",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of [`PolicyKind`]s.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PolicySet(u8);

impl PolicySet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, kind: PolicyKind) {
        self.0 |= kind.bit();
    }

    pub fn contains(&self, kind: PolicyKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Keep only the kinds for which `keep` returns true.
    pub fn filter(self, mut keep: impl FnMut(PolicyKind) -> bool) -> Self {
        self.iter().filter(|k| keep(*k)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = PolicyKind> + '_ {
        PolicyKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl FromIterator<PolicyKind> for PolicySet {
    fn from_iter<I: IntoIterator<Item = PolicyKind>>(iter: I) -> Self {
        let mut set = PolicySet::empty();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

impl fmt::Debug for PolicySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
