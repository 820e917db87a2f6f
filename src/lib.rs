//! plugwire - remote call specifications for plugin functions
//!
//! A function defined in one process is described by a [`CallSpec`] built
//! from its signature and a pool of converters; another process pairs that
//! spec with a target function to get an invoker that runs on wire messages.
//! The crate also provides short, collision-free display identifiers for log
//! partitions.

// Core modules
pub mod core;
pub mod mapper;
pub mod plugin;
pub mod component;
pub mod errors;
pub mod frontend;
pub mod infrastructure;

// Re-export commonly used items
pub use self::core::{CallContext, Described, TypeDescriptor, TypeKind, Value};
pub use mapper::{Args, Converter, ConverterPool, Func, ResolvedChain};
pub use plugin::{
    build_spec, CallSpec, DynamicInvoker, FailedInvoker, Invoke, InvokerRegistry, PluginRegistry,
};
pub use component::{LogEvent, LogViewer, PartitionViewer, SharedPartitionViewer};
pub use errors::{CallError, ConfigError, ConvertError, ResolveError, SpecError};
pub use frontend::Config;
pub use infrastructure::{init_dev_logging, init_logging, init_prod_logging, LogConfig, LogFormat, LogOutput};
