//! Type descriptors and the operations they declare.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::marker::{Marker, MarkerKind};

/// What an operation hands back to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnKind {
    Unit,
    Value,
    /// A future/completion-stage style result.
    Future,
}

/// Name, parameter types and return kind of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub name: String,
    pub parameters: Vec<String>,
    pub returns: ReturnKind,
}

impl Signature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            returns: ReturnKind::Value,
        }
    }

    pub fn param(mut self, type_name: impl Into<String>) -> Self {
        self.parameters.push(type_name.into());
        self
    }

    pub fn returns(mut self, returns: ReturnKind) -> Self {
        self.returns = returns;
        self
    }

    /// Whether `other` has the same name and parameter list.
    pub fn overrides(&self, other: &Signature) -> bool {
        self.name == other.name && self.parameters == other.parameters
    }
}

/// A method as declared on a type: signature plus its own markers.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub signature: Signature,
    pub markers: Vec<Marker>,
}

/// Static metadata for one type in a hierarchy.
///
/// Types are compared by name. Synthetic types are generated proxies that stand
/// in front of a real declaring type reachable through `supertype`.
#[derive(Debug)]
pub struct TypeDescriptor {
    name: String,
    synthetic: bool,
    supertype: Option<Arc<TypeDescriptor>>,
    markers: Vec<Marker>,
    methods: Vec<MethodDecl>,
}

impl TypeDescriptor {
    pub fn builder(name: impl Into<String>) -> TypeBuilder {
        TypeBuilder {
            name: name.into(),
            synthetic: false,
            supertype: None,
            markers: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// A generated subclass of `parent` that overrides every method of it
    /// without carrying any markers.
    pub fn proxy_of(parent: &Arc<TypeDescriptor>, name: impl Into<String>) -> Arc<TypeDescriptor> {
        let methods = parent
            .methods
            .iter()
            .map(|m| MethodDecl {
                signature: m.signature.clone(),
                markers: Vec::new(),
            })
            .collect();
        Arc::new(TypeDescriptor {
            name: name.into(),
            synthetic: true,
            supertype: Some(Arc::clone(parent)),
            markers: Vec::new(),
            methods,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    pub fn supertype(&self) -> Option<&Arc<TypeDescriptor>> {
        self.supertype.as_ref()
    }

    /// Markers declared directly on this type.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, kind: &MarkerKind) -> Option<&Marker> {
        self.markers.iter().find(|m| m.is_kind(kind))
    }

    pub fn has_marker(&self, kind: &MarkerKind) -> bool {
        self.marker(kind).is_some()
    }

    /// Methods declared directly on this type.
    pub fn declared_methods(&self) -> &[MethodDecl] {
        &self.methods
    }

    /// This type followed by each of its supertypes.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// Names of this type and all supertypes.
    pub fn type_closure(&self) -> Vec<&str> {
        self.ancestors().map(TypeDescriptor::name).collect()
    }

    /// Find a method by name and parameter types on this type or a supertype.
    pub fn find_method(&self, name: &str, parameters: &[String]) -> Option<&MethodDecl> {
        self.ancestors().find_map(|ty| {
            ty.methods
                .iter()
                .find(|m| m.signature.name == name && m.signature.parameters == parameters)
        })
    }

    /// Operations declared directly on this type.
    pub fn operations(self: &Arc<Self>) -> impl Iterator<Item = Operation> + '_ {
        (0..self.methods.len()).map(move |index| Operation {
            declaring_type: Arc::clone(self),
            index,
        })
    }

    /// Own declarations followed by those inherited from each supertype.
    ///
    /// A supertype declaration overridden by a nearer non-synthetic type is
    /// left out. Synthetic overriders do not hide anything.
    pub fn visible_operations(self: &Arc<Self>) -> Vec<Operation> {
        let mut ops = Vec::new();
        let mut overriding: Vec<&Signature> = Vec::new();
        let mut current = Some(self);
        while let Some(ty) = current {
            for op in ty.operations() {
                if !overriding.iter().any(|sig| sig.overrides(op.signature())) {
                    ops.push(op);
                }
            }
            if !ty.synthetic {
                overriding.extend(ty.methods.iter().map(|m| &m.signature));
            }
            current = ty.supertype();
        }
        ops
    }

    /// Look up a declared operation by signature.
    pub fn operation(self: &Arc<Self>, name: &str, parameters: &[&str]) -> Option<Operation> {
        self.methods
            .iter()
            .position(|m| {
                m.signature.name == name
                    && m.signature.parameters.len() == parameters.len()
                    && m.signature.parameters.iter().zip(parameters).all(|(a, b)| a == b)
            })
            .map(|index| Operation {
                declaring_type: Arc::clone(self),
                index,
            })
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TypeDescriptor {}

/// Iterator over a type and its supertypes.
pub struct Ancestors<'a> {
    next: Option<&'a TypeDescriptor>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a TypeDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.supertype.as_deref();
        Some(current)
    }
}

/// Builder for [`TypeDescriptor`].
pub struct TypeBuilder {
    name: String,
    synthetic: bool,
    supertype: Option<Arc<TypeDescriptor>>,
    markers: Vec<Marker>,
    methods: Vec<MethodDecl>,
}

impl TypeBuilder {
    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    pub fn extends(mut self, supertype: &Arc<TypeDescriptor>) -> Self {
        self.supertype = Some(Arc::clone(supertype));
        self
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn method(mut self, signature: Signature, markers: Vec<Marker>) -> Self {
        self.methods.push(MethodDecl { signature, markers });
        self
    }

    pub fn build(self) -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor {
            name: self.name,
            synthetic: self.synthetic,
            supertype: self.supertype,
            markers: self.markers,
            methods: self.methods,
        })
    }
}

/// A unit of interceptable work: one method declared on one type.
///
/// Identity is the declaration (declaring type name plus name and parameter
/// types). Markers and proxy wrappers never take part in equality.
#[derive(Clone)]
pub struct Operation {
    declaring_type: Arc<TypeDescriptor>,
    index: usize,
}

impl Operation {
    pub fn declaring_type(&self) -> &Arc<TypeDescriptor> {
        &self.declaring_type
    }

    fn decl(&self) -> &MethodDecl {
        &self.declaring_type.methods[self.index]
    }

    pub fn signature(&self) -> &Signature {
        &self.decl().signature
    }

    pub fn name(&self) -> &str {
        &self.decl().signature.name
    }

    /// Markers declared on the method itself.
    pub fn markers(&self) -> &[Marker] {
        &self.decl().markers
    }

    pub fn marker(&self, kind: &MarkerKind) -> Option<&Marker> {
        self.markers().iter().find(|m| m.is_kind(kind))
    }

    /// The same method declared on `ty` or one of its supertypes, if any.
    pub fn redeclared_on(&self, ty: &Arc<TypeDescriptor>) -> Option<Operation> {
        let signature = self.signature();
        let mut current = Some(ty);
        while let Some(candidate) = current {
            if let Some(index) = candidate
                .methods
                .iter()
                .position(|m| m.signature.overrides(signature))
            {
                return Some(Operation {
                    declaring_type: Arc::clone(candidate),
                    index,
                });
            }
            current = candidate.supertype();
        }
        None
    }

    fn key(&self) -> (&str, &str, &[String]) {
        let sig = self.signature();
        (self.declaring_type.name(), &sig.name, &sig.parameters)
    }
}

impl PartialEq for Operation {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Operation {}

impl Hash for Operation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for Operation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Operation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sig = self.signature();
        write!(
            f,
            "{}.{}({})",
            self.declaring_type.name(),
            sig.name,
            sig.parameters.join(", ")
        )
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Operation({self})")
    }
}

/// Anything with a runtime type.
pub trait Typed {
    fn runtime_type(&self) -> &Arc<TypeDescriptor>;
}

impl Typed for Arc<TypeDescriptor> {
    fn runtime_type(&self) -> &Arc<TypeDescriptor> {
        self
    }
}

/// A component handed over by the host during discovery.
#[derive(Debug, Clone)]
pub struct ManagedComponent {
    bean_type: Arc<TypeDescriptor>,
}

impl ManagedComponent {
    pub fn new(bean_type: Arc<TypeDescriptor>) -> Self {
        Self { bean_type }
    }

    pub fn bean_type(&self) -> &Arc<TypeDescriptor> {
        &self.bean_type
    }

    /// Every operation visible on the component.
    pub fn operations(&self) -> Vec<Operation> {
        self.bean_type.visible_operations()
    }
}

impl Typed for ManagedComponent {
    fn runtime_type(&self) -> &Arc<TypeDescriptor> {
        &self.bean_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Arc<TypeDescriptor> {
        TypeDescriptor::builder("PaymentService")
            .method(Signature::new("charge").param("Order"), vec![])
            .method(Signature::new("refund").param("Order"), vec![])
            .build()
    }

    #[test]
    fn test_operation_identity_ignores_markers() {
        let ty = base();
        let a = ty.operation("charge", &["Order"]).unwrap();
        let b = ty.operation("charge", &["Order"]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, ty.operation("refund", &["Order"]).unwrap());
    }

    #[test]
    fn test_operation_display() {
        let op = base().operation("charge", &["Order"]).unwrap();
        assert_eq!(op.to_string(), "PaymentService.charge(Order)");
    }

    #[test]
    fn test_component_operations_include_inherited() {
        let parent = base();
        let child = TypeDescriptor::builder("CardPaymentService")
            .extends(&parent)
            .method(Signature::new("authorize"), vec![])
            .build();

        let ops = ManagedComponent::new(child).operations();
        let names: Vec<_> = ops.iter().map(|o| o.name().to_string()).collect();
        assert_eq!(names, vec!["authorize", "charge", "refund"]);
        assert_eq!(ops[1].declaring_type().name(), "PaymentService");
    }

    #[test]
    fn test_overridden_supertype_declaration_hidden() {
        let parent = base();
        let child = TypeDescriptor::builder("CardPaymentService")
            .extends(&parent)
            .method(Signature::new("charge").param("Order"), vec![])
            .build();

        let ops = ManagedComponent::new(child).operations();
        let owners: Vec<_> = ops
            .iter()
            .map(|o| format!("{}.{}", o.declaring_type().name(), o.name()))
            .collect();
        assert_eq!(
            owners,
            vec!["CardPaymentService.charge", "PaymentService.refund"]
        );
    }

    #[test]
    fn test_synthetic_override_keeps_supertype_declaration() {
        let parent = base();
        let proxy = TypeDescriptor::proxy_of(&parent, "PaymentService$Proxy");

        let ops = ManagedComponent::new(proxy).operations();
        assert_eq!(ops.len(), 4);
        assert!(ops.contains(&parent.operation("charge", &["Order"]).unwrap()));
    }

    #[test]
    fn test_redeclared_on_finds_supertype_declaration() {
        let parent = base();
        let proxy = TypeDescriptor::proxy_of(&parent, "PaymentService$Proxy");
        let proxied = proxy.operation("charge", &["Order"]).unwrap();

        let real = proxied.redeclared_on(&parent).unwrap();
        assert_eq!(real.declaring_type().name(), "PaymentService");
        assert_ne!(proxied, real);
    }

    #[test]
    fn test_type_closure_lists_ancestors() {
        let parent = base();
        let proxy = TypeDescriptor::proxy_of(&parent, "PaymentService$Proxy");
        assert_eq!(proxy.type_closure(), vec!["PaymentService$Proxy", "PaymentService"]);
        assert!(proxy.find_method("refund", &["Order".to_string()]).is_some());
    }
}
