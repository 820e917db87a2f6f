use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

/// Capability tag of a type as seen by the remote call machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Plain in-process type; must be produced or consumed through converters
    Native,
    /// Structured, externally serializable message with its canonical name
    Wire(&'static str),
    /// Ambient call context supplied by the transport
    Context,
}

/// Identity and capabilities of a parameter or return type.
///
/// Descriptors are built explicitly at start-up. Two descriptors are equal
/// when they describe the same Rust type; the kind and supertypes are
/// metadata attached to that identity.
#[derive(Clone)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
    kind: TypeKind,
    supertypes: SmallVec<[TypeId; 2]>,
}

impl TypeDescriptor {
    pub fn native<T: Any>() -> Self {
        Self::with_kind::<T>(TypeKind::Native)
    }

    /// Describe a wire message. `message` is the canonical name used in
    /// call specs, identical on both sides of the process boundary.
    pub fn wire<T: Any>(message: &'static str) -> Self {
        Self::with_kind::<T>(TypeKind::Wire(message))
    }

    pub fn context() -> Self {
        super::value::CallContext::descriptor()
    }

    pub(crate) fn with_kind<T: Any>(kind: TypeKind) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            kind,
            supertypes: SmallVec::new(),
        }
    }

    /// Declare that values of this type may be used wherever `S` is expected.
    pub fn implementing<S: Any>(mut self) -> Self {
        let id = TypeId::of::<S>();
        if !self.supertypes.contains(&id) {
            self.supertypes.push(id);
        }
        self
    }

    pub fn of<T: Described>() -> Self {
        T::descriptor()
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_wire_message(&self) -> bool {
        matches!(self.kind, TypeKind::Wire(_))
    }

    pub fn is_call_context(&self) -> bool {
        self.kind == TypeKind::Context
    }

    /// Canonical message name, for wire messages only.
    pub fn message_name(&self) -> Option<&'static str> {
        match self.kind {
            TypeKind::Wire(name) => Some(name),
            _ => None,
        }
    }

    /// True if a value of type `other` can be used where `self` is expected.
    pub fn is_assignable_from(&self, other: &TypeDescriptor) -> bool {
        self.id == other.id || other.supertypes.contains(&self.id)
    }

    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TypeKind::Wire(message) => write!(f, "{} ({})", self.name, message),
            _ => write!(f, "{}", self.name),
        }
    }
}

/// Types that carry their own descriptor.
///
/// Implemented once per type that flows through converters or function
/// signatures:
///
/// ```
/// use plugwire::{Described, TypeDescriptor};
///
/// struct Deployment { id: u64 }
///
/// impl Described for Deployment {
///     fn descriptor() -> TypeDescriptor {
///         TypeDescriptor::wire::<Self>("plugwire.Deployment")
///     }
/// }
///
/// assert!(Deployment::descriptor().is_wire_message());
/// ```
pub trait Described: Any + Send + Sync {
    fn descriptor() -> TypeDescriptor;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Message;
    struct Interface;
    struct Concrete;

    #[test]
    fn test_identity_and_kind() {
        let a = TypeDescriptor::wire::<Message>("test.Message");
        let b = TypeDescriptor::wire::<Message>("test.Message");
        assert_eq!(a, b);
        assert!(a.is_wire_message());
        assert!(!a.is_call_context());
        assert_eq!(a.message_name(), Some("test.Message"));

        let native = TypeDescriptor::native::<Concrete>();
        assert_ne!(a, native);
        assert_eq!(native.message_name(), None);
    }

    #[test]
    fn test_assignability() {
        let interface = TypeDescriptor::native::<Interface>();
        let concrete = TypeDescriptor::native::<Concrete>().implementing::<Interface>();

        assert!(interface.is_assignable_from(&concrete));
        assert!(!concrete.is_assignable_from(&interface));
        assert!(concrete.is_assignable_from(&concrete));
    }

    #[test]
    fn test_context_descriptor() {
        let ctx = TypeDescriptor::context();
        assert!(ctx.is_call_context());
        assert!(!ctx.is_wire_message());
    }
}
