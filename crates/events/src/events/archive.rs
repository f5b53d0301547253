use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;

/// Archive packaging events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ArchiveEvent {
    /// Archive creation started
    Started { path: PathBuf, entries: usize },

    /// Archive written and renamed into place
    Completed { path: PathBuf, size: u64 },

    /// Checksum sidecar written
    ChecksumWritten { path: PathBuf, checksum: String },

    /// Staging area removed
    StagingDiscarded { path: PathBuf },

    /// Archive creation failed
    Failed { failure: FailureContext },
}
