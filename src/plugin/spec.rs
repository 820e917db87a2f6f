//! Call specifications
//!
//! A [`CallSpec`] is the wire contract for one remotely callable function:
//! the message names of its arguments, in parameter order with the call
//! context left out, and the message name of its result. Both sides derive it
//! independently from the same signature and converter pool.

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span};

use crate::core::TypeDescriptor;
use crate::mapper::{resolve_input, resolve_output, ConverterPool, Func, ResolvedChain};
use crate::errors::SpecError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallSpec {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub result: String,
}

impl CallSpec {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Chains resolved for every parameter and for the output of a function.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// One chain per parameter, in parameter order
    pub inputs: Vec<ResolvedChain>,
    pub output: ResolvedChain,
}

impl Resolution {
    /// Message names of the wire arguments, call context excluded.
    pub fn arg_names(&self) -> Vec<String> {
        self.inputs
            .iter()
            .filter(|chain| !chain.source().is_call_context())
            .map(|chain| message_name(chain.source()))
            .collect()
    }

    pub fn result_name(&self) -> String {
        message_name(self.output.target())
    }

    pub fn to_spec(&self, name: impl Into<String>) -> CallSpec {
        CallSpec {
            name: name.into(),
            args: self.arg_names(),
            result: self.result_name(),
        }
    }
}

/// Types a remote caller can supply directly.
pub fn is_suppliable(ty: &TypeDescriptor) -> bool {
    ty.is_wire_message() || ty.is_call_context()
}

/// Resolve the input and output chains of `func` against `pool`.
pub fn resolve_func(func: &Func, pool: &ConverterPool) -> Result<Resolution, SpecError> {
    let mut inputs = Vec::with_capacity(func.params().len());

    for (index, param) in func.params().iter().enumerate() {
        let chain = resolve_input(param, pool, is_suppliable).map_err(|_| {
            SpecError::UnsatisfiableInput {
                function: func.name().to_string(),
                index,
                ty: param.to_string(),
            }
        })?;
        debug!(
            index,
            param = param.name(),
            source = chain.source().name(),
            converters = chain.len(),
            "resolved argument"
        );
        inputs.push(chain);
    }

    let output = resolve_output(func.output(), pool, TypeDescriptor::is_wire_message).map_err(
        |_| SpecError::UnsatisfiableOutput {
            function: func.name().to_string(),
            ty: func.output().to_string(),
        },
    )?;
    debug!(
        output = func.output().name(),
        target = output.target().name(),
        converters = output.len(),
        "resolved result"
    );

    Ok(Resolution { inputs, output })
}

/// Build the call spec for `func`.
///
/// Fails when a parameter cannot be produced from wire messages or the call
/// context, or when the output cannot be turned into a wire message. The spec
/// is named after the function on this side.
pub fn build_spec(func: &Func, pool: &ConverterPool) -> Result<CallSpec, SpecError> {
    let span = debug_span!("build_spec", function = func.name());
    let _enter = span.enter();

    let resolution = resolve_func(func, pool)?;
    let spec = resolution.to_spec(func.name());
    debug!(args = ?spec.args, result = %spec.result, "built call spec");
    Ok(spec)
}

// Wire descriptors always carry a message name; the fallback only matters for
// hand-built descriptors that bypass `TypeDescriptor::wire`.
fn message_name(ty: &TypeDescriptor) -> String {
    ty.message_name().unwrap_or(ty.name()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CallContext, Described};
    use crate::mapper::Converter;

    struct Job;
    struct JobId;
    struct Status;
    struct Opaque;

    impl Described for Job {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::wire::<Self>("test.Job")
        }
    }
    impl Described for Status {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::wire::<Self>("test.Status")
        }
    }
    impl Described for JobId {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::native::<Self>()
        }
    }
    impl Described for Opaque {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::native::<Self>()
        }
    }

    #[test]
    fn test_all_wire_signature() {
        let f = Func::builder("run")
            .param::<CallContext>()
            .param::<Job>()
            .returns(|_| Ok(Status));

        let spec = build_spec(&f, &ConverterPool::new()).unwrap();
        assert_eq!(spec.name, "run");
        assert_eq!(spec.args, vec!["test.Job".to_string()]);
        assert_eq!(spec.result, "test.Status");
    }

    #[test]
    fn test_converted_argument_and_result() {
        let pool = ConverterPool::new()
            .with(Converter::new("job_id", |_: &Job| Ok(JobId)))
            .with(Converter::new("status", |_: &JobId| Ok(Status)));
        let f = Func::builder("cancel").param::<JobId>().returns(|_| Ok(JobId));

        let resolution = resolve_func(&f, &pool).unwrap();
        assert_eq!(resolution.inputs[0].len(), 1);
        assert_eq!(resolution.output.len(), 1);

        let spec = build_spec(&f, &pool).unwrap();
        assert_eq!(spec.args, vec!["test.Job".to_string()]);
        assert_eq!(spec.result, "test.Status");
    }

    #[test]
    fn test_unsatisfiable_input() {
        let f = Func::builder("inspect")
            .param::<Job>()
            .param::<Opaque>()
            .returns(|_| Ok(Status));

        match build_spec(&f, &ConverterPool::new()) {
            Err(SpecError::UnsatisfiableInput { function, index, .. }) => {
                assert_eq!(function, "inspect");
                assert_eq!(index, 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_unsatisfiable_output() {
        let f = Func::builder("leak").param::<Job>().returns(|_| Ok(Opaque));
        assert!(matches!(
            build_spec(&f, &ConverterPool::new()),
            Err(SpecError::UnsatisfiableOutput { .. })
        ));
    }

    #[test]
    fn test_json_shape() {
        let spec = CallSpec {
            name: "run".to_string(),
            args: vec!["test.Job".to_string()],
            result: "test.Status".to_string(),
        };
        let json = spec.to_json().unwrap();
        assert_eq!(json, r#"{"name":"run","args":["test.Job"],"result":"test.Status"}"#);
        assert_eq!(CallSpec::from_json(&json).unwrap(), spec);
    }
}
