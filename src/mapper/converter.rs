//! Converters and converter pools
//!
//! A converter is an edge in the type graph: a pure function from one
//! described type to another. Pools keep converters in declaration order,
//! which is the tie-break order used by chain resolution.

use std::fmt;
use std::sync::Arc;

use crate::core::{Described, TypeDescriptor, Value};
use crate::errors::ConvertError;

type ConvertFn = dyn Fn(&Value) -> anyhow::Result<Value> + Send + Sync;

#[derive(Clone)]
pub struct Converter {
    name: String,
    input: TypeDescriptor,
    output: TypeDescriptor,
    func: Arc<ConvertFn>,
}

impl Converter {
    /// Build a converter between two concrete types.
    pub fn new<I, O, F>(name: impl Into<String>, f: F) -> Self
    where
        I: Described,
        O: Described,
        F: Fn(&I) -> anyhow::Result<O> + Send + Sync + 'static,
    {
        let name = name.into();
        let converter = name.clone();
        Self {
            name,
            input: I::descriptor(),
            output: O::descriptor(),
            func: Arc::new(move |value: &Value| {
                let input = value.downcast_ref::<I>().ok_or_else(|| {
                    anyhow::anyhow!(
                        "converter '{}' cannot read a value of type {}",
                        converter,
                        value.ty().name()
                    )
                })?;
                f(input).map(Value::new)
            }),
        }
    }

    /// Build a converter over untyped values. Needed when the declared input
    /// is an interface-like type that several concrete types implement.
    pub fn dynamic<F>(
        name: impl Into<String>,
        input: TypeDescriptor,
        output: TypeDescriptor,
        f: F,
    ) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            input,
            output,
            func: Arc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input(&self) -> &TypeDescriptor {
        &self.input
    }

    pub fn output(&self) -> &TypeDescriptor {
        &self.output
    }

    /// Run the converter on a value, checking both ends against the declared
    /// types.
    pub fn apply(&self, value: &Value) -> Result<Value, ConvertError> {
        if !self.input.is_assignable_from(value.ty()) {
            return Err(ConvertError::InputType {
                converter: self.name.clone(),
                expected: self.input.to_string(),
                found: value.ty().to_string(),
            });
        }

        let out = (self.func)(value).map_err(|source| ConvertError::Failed {
            converter: self.name.clone(),
            source,
        })?;

        if !self.output.is_assignable_from(out.ty()) {
            return Err(ConvertError::TypeMismatch {
                expected: self.output.to_string(),
                found: out.ty().to_string(),
            });
        }

        Ok(out)
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("name", &self.name)
            .field("input", &self.input.name())
            .field("output", &self.output.name())
            .finish()
    }
}

impl fmt::Display for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.name, self.input.name(), self.output.name())
    }
}

/// Converters available for chaining, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ConverterPool {
    converters: Vec<Converter>,
}

impl ConverterPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, converter: Converter) -> Self {
        self.converters.push(converter);
        self
    }

    pub fn push(&mut self, converter: Converter) {
        self.converters.push(converter);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Converter> {
        self.converters.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Converter> {
        self.converters.get(index)
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl FromIterator<Converter> for ConverterPool {
    fn from_iter<T: IntoIterator<Item = Converter>>(iter: T) -> Self {
        Self {
            converters: iter.into_iter().collect(),
        }
    }
}
