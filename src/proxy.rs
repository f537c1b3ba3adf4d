//! Resolution of generated proxy types to the user-authored type behind them.

use std::sync::Arc;

use crate::model::{Operation, TypeDescriptor, Typed};

/// The first non-synthetic type in the supertype chain of `ty`.
///
/// A synthetic type without a supertype is returned unchanged.
pub fn real_type(ty: &Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
    let mut current = ty;
    while current.is_synthetic() {
        match current.supertype() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    Arc::clone(current)
}

/// The real class of a runtime instance, skipping proxies.
pub fn real_class_of<T: Typed + ?Sized>(instance: &T) -> Arc<TypeDescriptor> {
    real_type(instance.runtime_type())
}

/// Attribute an operation seen on a proxy to the real declaring type.
///
/// Operations already declared on a real type are returned as-is.
pub fn resolve_operation(operation: &Operation) -> Operation {
    let declaring = operation.declaring_type();
    if !declaring.is_synthetic() {
        return operation.clone();
    }
    let real = real_type(declaring);
    operation
        .redeclared_on(&real)
        .unwrap_or_else(|| operation.clone())
}
