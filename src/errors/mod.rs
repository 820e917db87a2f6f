//! Error types for spec building, invocation and configuration
//!
//! Registration-time failures ([`SpecError`]) are kept apart from call-time
//! failures ([`CallError`]) so that a plugin host can reject a single function
//! without affecting the others, and so that callers can tell a malformed
//! request from a failure inside the target function.

use std::path::PathBuf;
use thiserror::Error;

/// A converter could not turn one value into another.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("converter '{converter}' expects {expected}, got {found}")]
    InputType {
        converter: String,
        expected: String,
        found: String,
    },

    #[error("expected a value of type {expected}, got {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("converter '{converter}' failed: {source}")]
    Failed {
        converter: String,
        #[source]
        source: anyhow::Error,
    },
}

/// No converter chain links a type to an acceptable one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no converter chain reaches an acceptable type from {ty}")]
pub struct ResolveError {
    pub ty: String,
}

/// Registration-time failure: the function cannot be exposed remotely.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error(
        "cannot satisfy function {function}: no argument path to wire types \
         (parameter {index} of type {ty} is not a wire message and has no \
         converters leading to one)"
    )]
    UnsatisfiableInput {
        function: String,
        index: usize,
        ty: String,
    },

    #[error(
        "function {function} must produce a wire-message-compatible output \
         ({ty} is not a wire message and has no converter chain to one)"
    )]
    UnsatisfiableOutput { function: String, ty: String },

    #[error("call spec for {function} does not match the target: expected {expected}, resolved {found}")]
    SpecMismatch {
        function: String,
        expected: String,
        found: String,
    },
}

/// Call-time failure of a dynamic invocation.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("function {function} takes {expected} wire arguments, got {found}")]
    ArgumentCount {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("argument conversion failed for {function} at slot {slot}: {source}")]
    ArgumentConversion {
        function: String,
        slot: usize,
        #[source]
        source: ConvertError,
    },

    #[error("function {function} failed: {source}")]
    Target {
        function: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("result conversion failed for {function}: {source}")]
    ResultConversion {
        function: String,
        #[source]
        source: ConvertError,
    },

    #[error("function {function} is not available: {reason}")]
    Unavailable { function: String, reason: SpecError },

    #[error("no function registered under the name {0}")]
    UnknownFunction(String),
}

impl CallError {
    /// True for errors raised while marshalling arguments or results, as
    /// opposed to errors returned by the target function itself.
    pub fn is_marshalling(&self) -> bool {
        matches!(
            self,
            Self::ArgumentCount { .. }
                | Self::ArgumentConversion { .. }
                | Self::ResultConversion { .. }
        )
    }

    pub fn is_target(&self) -> bool {
        matches!(self, Self::Target { .. })
    }

    /// Unwrap the target function's own error, if that is what failed.
    pub fn into_target_error(self) -> Option<anyhow::Error> {
        match self {
            Self::Target { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid log level '{0}'")]
    InvalidLevel(String),
}
