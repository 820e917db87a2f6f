//! Remote-callable plugin functions
//!
//! - `spec.rs` - call specs built from function signatures
//! - `invoke.rs` - invokers that run a target from wire arguments
//! - `registry.rs` - per-process registries of specs and invokers

pub mod spec;
pub mod invoke;
pub mod registry;

pub use spec::{build_spec, is_suppliable, resolve_func, CallSpec, Resolution};
pub use invoke::{DynamicInvoker, FailedInvoker, Invoke};
pub use registry::{InvokerRegistry, PluginRegistry};
