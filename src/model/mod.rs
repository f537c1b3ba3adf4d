//! Metadata model for discovered components.
//!
//! The host's type system is represented explicitly: a [`TypeDescriptor`] per
//! type (with a synthetic flag and a supertype link), the [`Marker`]s declared
//! on types and methods, and [`Operation`]s identifying one declared method.

mod marker;
mod policy;
mod types;

pub use marker::{
    BulkheadPolicy, CircuitBreakerPolicy, DeclaredDuration, FallbackPolicy, Marker, MarkerKind,
    RetryPolicy, TimeUnit, TimeoutPolicy, COMMAND_BINDING,
};
pub use policy::{PolicyKind, PolicySet};
pub use types::{
    Ancestors, ManagedComponent, MethodDecl, Operation, ReturnKind, Signature, TypeBuilder,
    TypeDescriptor, Typed,
};
