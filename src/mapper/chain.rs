//! Converter chain resolution
//!
//! Types are nodes and converters are directed edges from their input type
//! to their output type. Resolution is a breadth-first search:
//!
//! - backward from a required input type until a type the caller can supply
//!   is found ([`resolve_input`], [`resolve_inputs`])
//! - forward from a produced output type until a type the caller can consume
//!   is found ([`resolve_output`])
//!
//! Neighbours are expanded in pool declaration order and the search stops at
//! the first acceptable type discovered, so the shortest chain wins and ties
//! go to the converter declared first. Both processes of a remote call rely
//! on this being deterministic.

use std::collections::{HashMap, HashSet, VecDeque};

use smallvec::SmallVec;
use tracing::trace;

use super::converter::{Converter, ConverterPool};
use crate::core::{TypeDescriptor, Value};
use crate::errors::{ConvertError, ResolveError};

/// Converters to run in order to go from `source` to `target`.
#[derive(Debug, Clone)]
pub struct ResolvedChain {
    source: TypeDescriptor,
    target: TypeDescriptor,
    converters: SmallVec<[Converter; 4]>,
}

impl ResolvedChain {
    pub fn identity(ty: TypeDescriptor) -> Self {
        Self {
            source: ty.clone(),
            target: ty,
            converters: SmallVec::new(),
        }
    }

    /// Type the chain starts from
    pub fn source(&self) -> &TypeDescriptor {
        &self.source
    }

    /// Type the chain ends at
    pub fn target(&self) -> &TypeDescriptor {
        &self.target
    }

    pub fn converters(&self) -> &[Converter] {
        &self.converters
    }

    pub fn is_identity(&self) -> bool {
        self.converters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Feed a value through every converter of the chain.
    pub fn apply(&self, value: Value) -> Result<Value, ConvertError> {
        if !self.source.is_assignable_from(value.ty()) {
            return Err(ConvertError::TypeMismatch {
                expected: self.source.to_string(),
                found: value.ty().to_string(),
            });
        }

        self.converters
            .iter()
            .try_fold(value, |current, converter| converter.apply(&current))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Follow edges from output to input
    Backward,
    /// Follow edges from input to output
    Forward,
}

/// Find the chain that produces `target` from a type satisfying `acceptable`.
///
/// The call context is never reached through converters; converters taking
/// it as input are skipped.
pub fn resolve_input<F>(
    target: &TypeDescriptor,
    pool: &ConverterPool,
    acceptable: F,
) -> Result<ResolvedChain, ResolveError>
where
    F: Fn(&TypeDescriptor) -> bool,
{
    search(target, pool, &acceptable, Direction::Backward)
}

/// Resolve every target, in order. Fails on the first unreachable type.
pub fn resolve_inputs<F>(
    targets: &[TypeDescriptor],
    pool: &ConverterPool,
    acceptable: F,
) -> Result<Vec<ResolvedChain>, ResolveError>
where
    F: Fn(&TypeDescriptor) -> bool,
{
    targets
        .iter()
        .map(|target| search(target, pool, &acceptable, Direction::Backward))
        .collect()
}

/// Find the chain that turns `output` into a type satisfying `acceptable`.
pub fn resolve_output<F>(
    output: &TypeDescriptor,
    pool: &ConverterPool,
    acceptable: F,
) -> Result<ResolvedChain, ResolveError>
where
    F: Fn(&TypeDescriptor) -> bool,
{
    search(output, pool, &acceptable, Direction::Forward)
}

fn search<F>(
    start: &TypeDescriptor,
    pool: &ConverterPool,
    acceptable: &F,
    direction: Direction,
) -> Result<ResolvedChain, ResolveError>
where
    F: Fn(&TypeDescriptor) -> bool,
{
    if acceptable(start) {
        return Ok(ResolvedChain::identity(start.clone()));
    }

    let mut visited: HashSet<TypeDescriptor> = HashSet::new();
    visited.insert(start.clone());

    // node -> (converter index, node it was reached from)
    let mut parents: HashMap<TypeDescriptor, (usize, TypeDescriptor)> = HashMap::new();
    let mut queue = VecDeque::from([start.clone()]);

    while let Some(node) = queue.pop_front() {
        for (index, converter) in pool.iter().enumerate() {
            let next = match direction {
                Direction::Backward if node.is_assignable_from(converter.output()) => {
                    converter.input()
                }
                Direction::Forward if converter.input().is_assignable_from(&node) => {
                    converter.output()
                }
                _ => continue,
            };

            if next.is_call_context() || !visited.insert(next.clone()) {
                continue;
            }

            trace!(from = node.name(), to = next.name(), converter = converter.name(), "edge");
            parents.insert(next.clone(), (index, node.clone()));

            if acceptable(next) {
                return Ok(build_chain(start, next, &parents, pool, direction));
            }
            queue.push_back(next.clone());
        }
    }

    Err(ResolveError {
        ty: start.to_string(),
    })
}

fn build_chain(
    start: &TypeDescriptor,
    end: &TypeDescriptor,
    parents: &HashMap<TypeDescriptor, (usize, TypeDescriptor)>,
    pool: &ConverterPool,
    direction: Direction,
) -> ResolvedChain {
    let mut converters = SmallVec::new();
    let mut node = end;

    // Walking back from `end` to `start` visits converters in execution order
    // for backward searches and in reverse for forward ones.
    while node != start {
        let Some((index, previous)) = parents.get(node) else {
            break;
        };
        if let Some(converter) = pool.get(*index) {
            converters.push(converter.clone());
        }
        node = previous;
    }

    match direction {
        Direction::Backward => ResolvedChain {
            source: end.clone(),
            target: start.clone(),
            converters,
        },
        Direction::Forward => {
            converters.reverse();
            ResolvedChain {
                source: start.clone(),
                target: end.clone(),
                converters,
            }
        }
    }
}
