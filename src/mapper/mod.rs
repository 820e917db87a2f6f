//! Type converters and chain resolution
//!
//! - `converter.rs` - converters and ordered converter pools
//! - `chain.rs` - breadth-first search for converter chains
//! - `func.rs` - native function signatures and bodies

pub mod converter;
pub mod chain;
pub mod func;

pub use converter::{Converter, ConverterPool};
pub use chain::{resolve_input, resolve_inputs, resolve_output, ResolvedChain};
pub use func::{Args, Func, FuncBuilder};
