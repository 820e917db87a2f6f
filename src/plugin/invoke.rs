//! Dynamic invocation from call specs
//!
//! The invoking side pairs a received [`CallSpec`] with a concrete target
//! function. Each wire argument is run through the same converter chain the
//! spec was built from (wire → native), context parameters receive the call
//! context directly, and the target's result is converted back into a wire
//! message (native → wire).

use std::sync::Arc;

use tracing::{debug, debug_span, warn};

use super::spec::{resolve_func, CallSpec, Resolution};
use crate::core::{CallContext, Value};
use crate::errors::{CallError, ConvertError, SpecError};
use crate::mapper::{ConverterPool, Func};

/// Something that can be called with wire arguments.
pub trait Invoke: Send + Sync {
    fn name(&self) -> &str;

    fn call(&self, ctx: &CallContext, args: &[Value]) -> Result<Value, CallError>;
}

/// Invoker for a function whose spec was resolved successfully.
#[derive(Debug, Clone)]
pub struct DynamicInvoker {
    spec: Arc<CallSpec>,
    target: Func,
    resolution: Arc<Resolution>,
}

impl DynamicInvoker {
    /// Pair `spec` with `target`.
    ///
    /// The chains are resolved again on this side; if they do not reproduce
    /// the spec's argument and result names the two processes disagree on the
    /// contract and construction fails.
    pub fn new(spec: CallSpec, target: Func, pool: &ConverterPool) -> Result<Self, SpecError> {
        let target = target.renamed(spec.name.clone());
        let resolution = resolve_func(&target, pool)?;

        let args = resolution.arg_names();
        if args != spec.args {
            return Err(SpecError::SpecMismatch {
                function: spec.name.clone(),
                expected: format!("args {:?}", spec.args),
                found: format!("args {:?}", args),
            });
        }

        let result = resolution.result_name();
        if result != spec.result {
            return Err(SpecError::SpecMismatch {
                function: spec.name.clone(),
                expected: format!("result {}", spec.result),
                found: format!("result {}", result),
            });
        }

        Ok(Self {
            spec: Arc::new(spec),
            target,
            resolution: Arc::new(resolution),
        })
    }

    pub fn spec(&self) -> &CallSpec {
        &self.spec
    }

    fn native_args(&self, ctx: &CallContext, args: &[Value]) -> Result<Vec<Value>, CallError> {
        let mut wire = args.iter().enumerate();
        let mut native = Vec::with_capacity(self.resolution.inputs.len());

        for chain in &self.resolution.inputs {
            if chain.source().is_call_context() {
                native.push(Value::new(ctx.clone()));
                continue;
            }

            let Some((slot, arg)) = wire.next() else {
                return Err(self.count_error(args.len()));
            };

            let value = check_message(arg, &self.spec.args[slot])
                .and_then(|_| chain.apply(arg.clone()))
                .map_err(|source| CallError::ArgumentConversion {
                    function: self.spec.name.clone(),
                    slot,
                    source,
                })?;
            native.push(value);
        }

        Ok(native)
    }

    fn count_error(&self, found: usize) -> CallError {
        CallError::ArgumentCount {
            function: self.spec.name.clone(),
            expected: self.spec.args.len(),
            found,
        }
    }
}

impl Invoke for DynamicInvoker {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn call(&self, ctx: &CallContext, args: &[Value]) -> Result<Value, CallError> {
        let span = debug_span!("invoke", function = %self.spec.name, request_id = ?ctx.request_id);
        let _enter = span.enter();

        if args.len() != self.spec.args.len() {
            return Err(self.count_error(args.len()));
        }

        let native = self.native_args(ctx, args)?;

        let out = self.target.call(native).map_err(|source| CallError::Target {
            function: self.spec.name.clone(),
            source,
        })?;

        let output = &self.resolution.output;
        let result = if self.target.output().is_assignable_from(out.ty()) {
            output.apply(out)
        } else {
            Err(ConvertError::TypeMismatch {
                expected: self.target.output().to_string(),
                found: out.ty().to_string(),
            })
        };

        let result = result.map_err(|source| CallError::ResultConversion {
            function: self.spec.name.clone(),
            source,
        })?;
        debug!(result = result.ty().name(), "call completed");
        Ok(result)
    }
}

/// Stand-in for a function that could not be registered. Every call reports
/// the registration error instead of running anything.
#[derive(Debug, Clone)]
pub struct FailedInvoker {
    name: String,
    error: SpecError,
}

impl FailedInvoker {
    pub fn new(name: impl Into<String>, error: SpecError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }

    pub fn error(&self) -> &SpecError {
        &self.error
    }
}

impl Invoke for FailedInvoker {
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, _ctx: &CallContext, _args: &[Value]) -> Result<Value, CallError> {
        warn!(function = %self.name, error = %self.error, "call to unavailable function");
        Err(CallError::Unavailable {
            function: self.name.clone(),
            reason: self.error.clone(),
        })
    }
}

fn check_message(arg: &Value, expected: &str) -> Result<(), ConvertError> {
    match arg.ty().message_name() {
        Some(name) if name == expected => Ok(()),
        _ => Err(ConvertError::TypeMismatch {
            expected: expected.to_string(),
            found: arg.ty().to_string(),
        }),
    }
}
