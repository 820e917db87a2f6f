//! Log events and short partition identifiers
//!
//! Log streams are split into partitions named by long keys (deployment ids,
//! instance ids). A [`PartitionViewer`] maps those keys to short strings a UI
//! can show next to each line.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::SystemTime;

use data_encoding::BASE32_NOPAD;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::frontend::config::PartitionConfig;

/// Names shorter than this many bytes are shown as they are
pub const MIN_SHORTEN_LEN: usize = 10;

/// Length of a freshly assigned short name
pub const SHORT_PREFIX_LEN: usize = 7;

const DIGEST_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub partition: String,
    pub timestamp: SystemTime,
    pub message: String,
}

/// Source of log lines, returned in batches by a platform's logging system.
pub trait LogViewer {
    /// Next batch of events. An empty batch means nothing is available yet.
    fn next_batch(&mut self) -> anyhow::Result<Vec<LogEvent>>;
}

/// Assigns short display names to partitions.
///
/// Not safe for concurrent mutation; see [`SharedPartitionViewer`].
#[derive(Debug, Clone)]
pub struct PartitionViewer {
    shortened: HashMap<String, String>,
    assigned: HashSet<String>,
    min_length: usize,
    prefix_length: usize,
}

impl Default for PartitionViewer {
    fn default() -> Self {
        Self {
            shortened: HashMap::new(),
            assigned: HashSet::new(),
            min_length: MIN_SHORTEN_LEN,
            prefix_length: SHORT_PREFIX_LEN,
        }
    }
}

impl PartitionViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &PartitionConfig) -> Self {
        Self {
            min_length: config.min_length,
            prefix_length: config.prefix_length.max(1),
            ..Self::default()
        }
    }

    /// Short display name for `part`.
    ///
    /// The first lookup of a long name hashes it and takes the shortest free
    /// prefix of the encoded digest, starting at the configured prefix
    /// length. Later lookups return the memoized name. Because a prefix taken
    /// by an earlier name is skipped, results depend on lookup order.
    ///
    /// Names shorter than the minimum length (in bytes) are returned as is and
    /// reserved, so later hashed names never take them. The reverse does not
    /// hold: a short name equal to an identifier already handed out is still
    /// returned unchanged and duplicates it.
    pub fn short(&mut self, part: &str) -> String {
        if part.len() < self.min_length {
            self.assigned.insert(part.to_string());
            return part.to_string();
        }

        if let Some(short) = self.shortened.get(part) {
            return short.clone();
        }

        self.assign(part, &encode_digest(part))
    }

    fn assign(&mut self, part: &str, encoded: &str) -> String {
        let start = self.prefix_length.min(encoded.len());
        let short = (start..=encoded.len())
            .map(|len| &encoded[..len])
            .find(|candidate| !self.assigned.contains(*candidate))
            .map(str::to_string)
            .unwrap_or_else(|| {
                (1u64..)
                    .map(|n| format!("{}{}", encoded, n))
                    .find(|candidate| !self.assigned.contains(candidate))
                    .unwrap_or_default()
            });

        self.assigned.insert(short.clone());
        self.shortened.insert(part.to_string(), short.clone());
        short
    }

    /// Render an event as `[short] message`.
    pub fn label(&mut self, event: &LogEvent) -> String {
        format!("[{}] {}", self.short(&event.partition), event.message)
    }

    /// Pull one batch from `viewer` and label every event.
    pub fn render_batch(&mut self, viewer: &mut dyn LogViewer) -> anyhow::Result<Vec<String>> {
        let batch = viewer.next_batch()?;
        Ok(batch.iter().map(|event| self.label(event)).collect())
    }

    /// Number of long names shortened so far
    pub fn len(&self) -> usize {
        self.shortened.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shortened.is_empty()
    }
}

/// A [`PartitionViewer`] shared behind a mutex.
#[derive(Debug, Clone, Default)]
pub struct SharedPartitionViewer {
    inner: Arc<Mutex<PartitionViewer>>,
}

impl SharedPartitionViewer {
    pub fn new(viewer: PartitionViewer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(viewer)),
        }
    }

    pub fn short(&self, part: &str) -> String {
        self.inner.lock().short(part)
    }

    pub fn label(&self, event: &LogEvent) -> String {
        self.inner.lock().label(event)
    }
}

/// Lowercase base-32 encoding of a 512-bit blake3 digest of `part`.
fn encode_digest(part: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(part.as_bytes());
    let mut digest = [0u8; DIGEST_LEN];
    hasher.finalize_xof().fill(&mut digest);
    BASE32_NOPAD.encode(&digest).to_ascii_lowercase()
}
