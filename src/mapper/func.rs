//! Native function signatures
//!
//! A [`Func`] pairs a declared signature (parameter and output descriptors)
//! with a body over type-erased arguments. The signature is what chain
//! resolution works on; the body is only run by an invoker.

use std::fmt;
use std::sync::Arc;

use anyhow::Context as _;

use crate::core::{Described, TypeDescriptor, Value};

type FuncBody = dyn Fn(&Args) -> anyhow::Result<Value> + Send + Sync;

#[derive(Clone)]
pub struct Func {
    name: String,
    params: Vec<TypeDescriptor>,
    output: TypeDescriptor,
    body: Arc<FuncBody>,
}

impl Func {
    pub fn new<F>(
        name: impl Into<String>,
        params: Vec<TypeDescriptor>,
        output: TypeDescriptor,
        body: F,
    ) -> Self
    where
        F: Fn(&Args) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params,
            output,
            body: Arc::new(body),
        }
    }

    pub fn builder(name: impl Into<String>) -> FuncBuilder {
        FuncBuilder {
            name: name.into(),
            params: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[TypeDescriptor] {
        &self.params
    }

    pub fn output(&self) -> &TypeDescriptor {
        &self.output
    }

    /// Same signature and body under another name.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Run the body. Arguments are expected to match `params()`.
    pub fn call(&self, args: Vec<Value>) -> anyhow::Result<Value> {
        (self.body)(&Args { values: args })
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Func")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<_> = self.params.iter().map(|p| p.name()).collect();
        write!(f, "{}({}) -> {}", self.name, params.join(", "), self.output.name())
    }
}

/// Builds a [`Func`] from typed parameters.
///
/// ```
/// use plugwire::{CallContext, Described, Func, TypeDescriptor};
///
/// struct Name(String);
/// impl Described for Name {
///     fn descriptor() -> TypeDescriptor {
///         TypeDescriptor::wire::<Self>("demo.Name")
///     }
/// }
///
/// let greet = Func::builder("greet")
///     .param::<CallContext>()
///     .param::<Name>()
///     .returns(|args| {
///         let name = args.get::<Name>(1)?;
///         Ok(Name(format!("hello {}", name.0)))
///     });
///
/// assert_eq!(greet.params().len(), 2);
/// ```
pub struct FuncBuilder {
    name: String,
    params: Vec<TypeDescriptor>,
}

impl FuncBuilder {
    pub fn param<T: Described>(mut self) -> Self {
        self.params.push(T::descriptor());
        self
    }

    pub fn returns<R, F>(self, body: F) -> Func
    where
        R: Described,
        F: Fn(&Args) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        Func::new(self.name, self.params, R::descriptor(), move |args| {
            body(args).map(Value::new)
        })
    }
}

/// Positional arguments handed to a function body.
#[derive(Debug)]
pub struct Args {
    values: Vec<Value>,
}

impl Args {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Borrow argument `index` as a `T`.
    pub fn get<T: Described>(&self, index: usize) -> anyhow::Result<&T> {
        let value = self
            .values
            .get(index)
            .with_context(|| format!("missing argument {}", index))?;
        value.downcast_ref::<T>().with_context(|| {
            format!(
                "argument {} is {}, not {}",
                index,
                value.ty().name(),
                std::any::type_name::<T>()
            )
        })
    }

    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
