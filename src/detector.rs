//! Classification of operations by the policy markers they carry.
//!
//! Everything here is a pure function of static metadata.

use crate::gate::EnablementGate;
use crate::model::{Marker, MarkerKind, Operation, PolicyKind, PolicySet};

/// The declaration of `kind` in effect for `operation`.
///
/// The method's own marker wins. Kinds that apply at type level are then
/// looked up on the declaring type and its supertypes, nearest first.
pub fn effective_marker(operation: &Operation, kind: PolicyKind) -> Option<&Marker> {
    let marker_kind = MarkerKind::Policy(kind);
    if let Some(marker) = operation.marker(&marker_kind) {
        return Some(marker);
    }
    if !kind.applies_at_type_level() {
        return None;
    }
    operation
        .declaring_type()
        .ancestors()
        .find_map(|ty| ty.marker(&marker_kind))
}

/// Every policy kind declared for `operation`, regardless of enablement.
pub fn classify(operation: &Operation) -> PolicySet {
    PolicyKind::ALL
        .into_iter()
        .filter(|kind| effective_marker(operation, *kind).is_some())
        .collect()
}

/// The declared kinds that are in effect under `gate`.
pub fn classify_active(operation: &Operation, gate: &EnablementGate) -> PolicySet {
    classify(operation).filter(|kind| gate.allows(kind))
}

/// Whether `operation` needs interception and registration.
///
/// With non-fallback policies disabled, only a fallback marker qualifies.
pub fn is_fault_tolerance_method(operation: &Operation, gate: &EnablementGate) -> bool {
    !classify_active(operation, gate).is_empty()
}
