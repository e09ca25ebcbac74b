use serde::{Deserialize, Serialize};

/// What the reader does when a run, event, or image key repeats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Re-select the existing run or event and let repeated images
    /// overwrite. Every occurrence is logged at `warn`.
    #[default]
    Merge,
    /// Fail the read on the first repeated key.
    Reject,
}

/// Configuration for decoding DRDF streams.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadConfig {
    /// Handling of repeated run ids, event ids, and image sources.
    pub duplicates: DuplicatePolicy,
    /// Largest file `read_file` will load, in bytes (default: 4 GiB).
    pub max_file_size: u64,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            duplicates: DuplicatePolicy::default(),
            max_file_size: 4 * 1024 * 1024 * 1024, // 4 GiB
        }
    }
}

impl ReadConfig {
    /// A configuration that fails on any repeated key.
    pub fn strict() -> Self {
        Self {
            duplicates: DuplicatePolicy::Reject,
            ..Default::default()
        }
    }
}
