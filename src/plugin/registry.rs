//! Registries for both sides of a plugin call
//!
//! [`PluginRegistry`] lives in the process that defines functions and turns
//! them into call specs. [`InvokerRegistry`] lives in the process that
//! receives specs and dispatches calls to invokers by name.

use std::sync::Arc;

use dashmap::DashMap;
use rayon::prelude::*;
use tracing::{info, warn};

use super::invoke::{DynamicInvoker, FailedInvoker, Invoke};
use super::spec::{build_spec, CallSpec};
use crate::core::{CallContext, Value};
use crate::errors::{CallError, SpecError};
use crate::mapper::{ConverterPool, Func};

/// Functions exposed by a plugin, with the specs advertised for them.
pub struct PluginRegistry {
    pool: Arc<ConverterPool>,
    specs: DashMap<String, CallSpec>,
}

impl PluginRegistry {
    pub fn new(pool: Arc<ConverterPool>) -> Self {
        Self {
            pool,
            specs: DashMap::new(),
        }
    }

    /// Build and record the spec for one function. A failure leaves the
    /// registry untouched.
    pub fn register(&self, func: &Func) -> Result<CallSpec, SpecError> {
        match build_spec(func, &self.pool) {
            Ok(spec) => {
                info!(function = func.name(), args = spec.args.len(), "registered function");
                self.specs.insert(spec.name.clone(), spec.clone());
                Ok(spec)
            }
            Err(err) => {
                warn!(function = func.name(), error = %err, "function not exposed");
                Err(err)
            }
        }
    }

    /// Register many functions concurrently. Results come back in input order.
    pub fn register_all(&self, funcs: &[Func]) -> Vec<Result<CallSpec, SpecError>> {
        funcs.par_iter().map(|func| self.register(func)).collect()
    }

    pub fn spec(&self, name: &str) -> Option<CallSpec> {
        self.specs.get(name).map(|spec| spec.clone())
    }

    /// All specs, sorted by name.
    pub fn specs(&self) -> Vec<CallSpec> {
        let mut specs: Vec<_> = self.specs.iter().map(|entry| entry.value().clone()).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Invokers by function name.
pub struct InvokerRegistry {
    pool: Arc<ConverterPool>,
    invokers: DashMap<String, Arc<dyn Invoke>>,
}

impl InvokerRegistry {
    pub fn new(pool: Arc<ConverterPool>) -> Self {
        Self {
            pool,
            invokers: DashMap::new(),
        }
    }

    /// Pair a received spec with its target.
    ///
    /// On failure the name is still bound, to a [`FailedInvoker`], so that
    /// callers get the registration error back instead of an unknown-name
    /// error.
    pub fn install(&self, spec: CallSpec, target: Func) -> Result<(), SpecError> {
        let name = spec.name.clone();
        match DynamicInvoker::new(spec, target, &self.pool) {
            Ok(invoker) => {
                self.invokers.insert(name, Arc::new(invoker));
                Ok(())
            }
            Err(err) => {
                warn!(function = %name, error = %err, "installing failed invoker");
                self.invokers
                    .insert(name.clone(), Arc::new(FailedInvoker::new(name, err.clone())));
                Err(err)
            }
        }
    }

    pub fn insert(&self, invoker: Arc<dyn Invoke>) {
        self.invokers.insert(invoker.name().to_string(), invoker);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Invoke>> {
        self.invokers.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn call(&self, name: &str, ctx: &CallContext, args: &[Value]) -> Result<Value, CallError> {
        let invoker = self
            .get(name)
            .ok_or_else(|| CallError::UnknownFunction(name.to_string()))?;
        invoker.call(ctx, args)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.invokers.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.invokers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invokers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Described, TypeDescriptor};

    struct Ping;
    struct Pong;
    struct Secret;

    impl Described for Ping {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::wire::<Self>("test.Ping")
        }
    }
    impl Described for Pong {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::wire::<Self>("test.Pong")
        }
    }
    impl Described for Secret {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::native::<Self>()
        }
    }

    fn ping() -> Func {
        Func::builder("ping").param::<Ping>().returns(|_| Ok(Pong))
    }

    fn leak() -> Func {
        Func::builder("leak").param::<Secret>().returns(|_| Ok(Pong))
    }

    #[test]
    fn test_register_all_isolates_failures() {
        let registry = PluginRegistry::new(Arc::new(ConverterPool::new()));
        let results = registry.register_all(&[ping(), leak()]);

        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(SpecError::UnsatisfiableInput { .. })));
        assert_eq!(registry.len(), 1);
        assert!(registry.spec("ping").is_some());
        assert!(registry.spec("leak").is_none());
    }

    #[test]
    fn test_install_and_call() {
        let pool = Arc::new(ConverterPool::new());
        let spec = PluginRegistry::new(pool.clone()).register(&ping()).unwrap();

        let invokers = InvokerRegistry::new(pool);
        invokers.install(spec, ping()).unwrap();

        let out = invokers.call("ping", &CallContext::new(), &[Value::new(Ping)]).unwrap();
        assert!(out.is::<Pong>());
        assert_eq!(invokers.names(), vec!["ping".to_string()]);
    }

    #[test]
    fn test_unknown_function() {
        let invokers = InvokerRegistry::new(Arc::new(ConverterPool::new()));
        let err = invokers.call("missing", &CallContext::new(), &[]).unwrap_err();
        assert!(matches!(err, CallError::UnknownFunction(name) if name == "missing"));
    }

    #[test]
    fn test_failed_install_binds_failed_invoker() {
        let invokers = InvokerRegistry::new(Arc::new(ConverterPool::new()));
        let spec = CallSpec {
            name: "leak".to_string(),
            args: vec!["test.Ping".to_string()],
            result: "test.Pong".to_string(),
        };
        assert!(invokers.install(spec, leak()).is_err());

        let err = invokers.call("leak", &CallContext::new(), &[]).unwrap_err();
        assert!(matches!(err, CallError::Unavailable { .. }));
    }
}
