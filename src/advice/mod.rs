//! Aspect-oriented advice for cross-cutting concerns.
//!
//! This module provides wrapper types that change how a component's metadata
//! is reported to the host, without modifying the metadata itself.
//!
//! # Architecture
//!
//! Advice is applied when the host asks for interceptor binding metadata:
//!
//! ```ignore
//! // Plain metadata for the marker type
//! let retry = policy_marker_type(PolicyKind::Retry);
//!
//! // Apply advice
//! let binding = InterceptorBindingType::new(retry);
//!
//! // The host sees the synthetic binding marker
//! assert!(binding.is_annotation_present(&MarkerKind::CommandBinding));
//! ```
//!
//! # Available Advice
//!
//! - [`InterceptorBindingType`] - Reports `CommandBinding` on any wrapped view

mod binding;

pub use binding::{policy_marker_type, AnnotatedTypeView, InterceptorBindingType};
