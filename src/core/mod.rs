//! Core type model
//!
//! Type descriptors replace runtime reflection: every type that appears in a
//! converter or a remotely callable signature is described once at start-up,
//! tagged as a native type, a wire message or the call context.

pub mod types;
pub mod value;

pub use types::{Described, TypeDescriptor, TypeKind};
pub use value::{CallContext, Value};
