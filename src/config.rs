//! Resource limits applied when opening binaries.

use serde::{Deserialize, Serialize};

/// Default ceiling for both plain files and archive entries (100MB).
pub const DEFAULT_MAX_SIZE: u64 = 100 * 1024 * 1024;

/// Size limits enforced before any ELF parsing takes place.
///
/// Archive entries are materialized in memory for the lifetime of a handle
/// and parsed in place, so `max_entry_size` bounds the memory one handle can
/// hold besides its parsed section list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenLimits {
    /// Maximum size of a plain file that may be opened.
    pub max_file_size: u64,
    /// Maximum decompressed size of an archive entry.
    pub max_entry_size: u64,
}

impl Default for OpenLimits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_SIZE,
            max_entry_size: DEFAULT_MAX_SIZE,
        }
    }
}

impl OpenLimits {
    /// Limits with the same ceiling for files and entries.
    pub fn uniform(max_size: u64) -> Self {
        Self {
            max_file_size: max_size,
            max_entry_size: max_size,
        }
    }
}
