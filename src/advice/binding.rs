//! Interceptor binding advice.
//!
//! Wraps a type's metadata view so it reports the synthetic
//! `CommandBinding` marker, without touching the wrapped declaration.

use std::sync::Arc;

use crate::model::{
    Marker, MarkerKind, Operation, PolicyKind, TypeDescriptor, COMMAND_BINDING,
};

/// Read-only view of a type's metadata, as the interceptor runtime sees it.
pub trait AnnotatedTypeView {
    /// Name of the underlying type.
    fn type_name(&self) -> &str;

    /// Name of the type this view is declared as.
    fn base_type(&self) -> &str;

    /// The type and all of its supertypes.
    fn type_closure(&self) -> Vec<&str>;

    /// Operations declared on or inherited by the type.
    fn methods(&self) -> Vec<Operation>;

    /// Markers reported for the type.
    fn annotations(&self) -> &[Marker];

    fn annotation(&self, kind: &MarkerKind) -> Option<&Marker> {
        self.annotations().iter().find(|m| m.is_kind(kind))
    }

    fn is_annotation_present(&self, kind: &MarkerKind) -> bool {
        self.annotation(kind).is_some()
    }
}

impl AnnotatedTypeView for Arc<TypeDescriptor> {
    fn type_name(&self) -> &str {
        self.name()
    }

    fn base_type(&self) -> &str {
        self.name()
    }

    fn type_closure(&self) -> Vec<&str> {
        TypeDescriptor::type_closure(self)
    }

    fn methods(&self) -> Vec<Operation> {
        self.visible_operations()
    }

    fn annotations(&self) -> &[Marker] {
        self.markers()
    }
}

/// Metadata view that additionally reports `CommandBinding`.
///
/// The augmented marker list is computed once, at wrap time, so repeated
/// reads return the same slice.
///
/// # Example
///
/// ```ignore
/// let view = InterceptorBindingType::new(policy_marker_type(PolicyKind::Retry));
/// assert!(view.is_annotation_present(&MarkerKind::CommandBinding));
/// ```
pub struct InterceptorBindingType<D> {
    inner: D,
    annotations: Vec<Marker>,
}

impl<D: AnnotatedTypeView> InterceptorBindingType<D> {
    pub fn new(inner: D) -> Self {
        let mut annotations = inner.annotations().to_vec();
        if !annotations.iter().any(|m| m.is_kind(&MarkerKind::CommandBinding)) {
            annotations.push(COMMAND_BINDING.clone());
        }
        Self { inner, annotations }
    }

    /// Get a reference to the wrapped view.
    pub fn inner(&self) -> &D {
        &self.inner
    }

    /// Consume the wrapper and return the wrapped view.
    pub fn into_inner(self) -> D {
        self.inner
    }
}

impl<D: AnnotatedTypeView> AnnotatedTypeView for InterceptorBindingType<D> {
    fn type_name(&self) -> &str {
        self.inner.type_name()
    }

    fn base_type(&self) -> &str {
        self.inner.base_type()
    }

    fn type_closure(&self) -> Vec<&str> {
        self.inner.type_closure()
    }

    fn methods(&self) -> Vec<Operation> {
        self.inner.methods()
    }

    fn annotations(&self) -> &[Marker] {
        &self.annotations
    }

    fn annotation(&self, kind: &MarkerKind) -> Option<&Marker> {
        if *kind == MarkerKind::CommandBinding {
            return Some(&COMMAND_BINDING);
        }
        self.inner.annotation(kind)
    }

    fn is_annotation_present(&self, kind: &MarkerKind) -> bool {
        *kind == MarkerKind::CommandBinding || self.inner.is_annotation_present(kind)
    }
}

/// Type metadata for the marker of a policy kind.
pub fn policy_marker_type(kind: PolicyKind) -> Arc<TypeDescriptor> {
    let name = match kind {
        PolicyKind::Retry => "Retry",
        PolicyKind::CircuitBreaker => "CircuitBreaker",
        PolicyKind::Timeout => "Timeout",
        PolicyKind::Bulkhead => "Bulkhead",
        PolicyKind::Fallback => "Fallback",
        PolicyKind::Asynchronous => "Asynchronous",
    };
    TypeDescriptor::builder(name)
        .marker(Marker::named("Inherited"))
        .build()
}
