//! Platform components shared with plugins

pub mod logs;

pub use logs::{LogEvent, LogViewer, PartitionViewer, SharedPartitionViewer};
