use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;

use super::types::{Described, TypeDescriptor, TypeKind};

/// A type-erased value tagged with its descriptor.
///
/// Cloning is cheap; the payload is shared.
#[derive(Clone)]
pub struct Value {
    ty: TypeDescriptor,
    data: Arc<dyn Any + Send + Sync>,
}

impl Value {
    pub fn new<T: Described>(value: T) -> Self {
        Self {
            ty: T::descriptor(),
            data: Arc::new(value),
        }
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.data.is::<T>()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value").field("ty", &self.ty.name()).finish_non_exhaustive()
    }
}

static CONTEXT: Lazy<TypeDescriptor> =
    Lazy::new(|| TypeDescriptor::with_kind::<CallContext>(TypeKind::Context));

/// Request-scoped data supplied by the transport alongside every call.
///
/// Never part of the wire payload; injected into any parameter declared with
/// the context type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallContext {
    pub request_id: Option<String>,
    pub deadline: Option<Instant>,
    pub metadata: BTreeMap<String, String>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.map_or(false, |d| Instant::now() >= d)
    }
}

impl Described for CallContext {
    fn descriptor() -> TypeDescriptor {
        CONTEXT.clone()
    }
}
